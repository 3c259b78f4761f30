//! Satellite LNB descriptors.
//!
//! Only the LNB name crosses the wire; the descriptor is resolved locally.

use std::fmt;

/// A frequency range in MHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreqRange {
    pub low: u32,
    pub high: u32,
}

/// Local oscillator layout of an LNB, frequencies in MHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LnbDescriptor {
    pub name: &'static str,
    /// Short name sent to the daemon.
    pub alias: &'static str,
    pub lowfreq: u32,
    /// Zero for single-LO LNBs.
    pub highfreq: u32,
    /// Zero unless the LNB switches band by frequency.
    pub rangeswitch: u32,
    pub freqrange: &'static [FreqRange],
}

impl LnbDescriptor {
    pub fn is_dual_lo(&self) -> bool {
        self.highfreq != 0
    }

    /// Whether `freq_mhz` falls in one of the LNB's input ranges.
    pub fn covers(&self, freq_mhz: u32) -> bool {
        self.freqrange
            .iter()
            .any(|range| (range.low..=range.high).contains(&freq_mhz))
    }
}

impl fmt::Display for LnbDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\n\t{}", self.alias, self.name)?;
        let ranges: Vec<String> = self
            .freqrange
            .iter()
            .map(|r| format!("{} to {} MHz", r.low, r.high))
            .collect();
        writeln!(f, "\t{}", ranges.join(" and "))?;

        if !self.is_dual_lo() {
            return write!(f, "\tSingle LO, IF = {} MHz", self.lowfreq);
        }
        if self.rangeswitch == 0 {
            return write!(
                f,
                "\tDual LO, Bandstacking, LO POL_R {} MHz, LO POL_L {} MHz",
                self.lowfreq, self.highfreq
            );
        }
        write!(
            f,
            "\tDual LO, IF = lowband {} MHz, highband {} MHz",
            self.lowfreq, self.highfreq
        )
    }
}

/// Resolves LNB names found in frontend parameters.
pub trait LnbCatalog: Send + Sync {
    fn lookup(&self, name: &str) -> Option<LnbDescriptor>;
}

/// The standard LNB table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLnbs;

impl LnbCatalog for BuiltinLnbs {
    fn lookup(&self, name: &str) -> Option<LnbDescriptor> {
        find_lnb(name).copied()
    }
}

static LNBS: [LnbDescriptor; 7] = [
    LnbDescriptor {
        name: "Europe",
        alias: "UNIVERSAL",
        lowfreq: 9750,
        highfreq: 10600,
        rangeswitch: 11700,
        freqrange: &[
            FreqRange { low: 10800, high: 11800 },
            FreqRange { low: 11600, high: 12700 },
        ],
    },
    LnbDescriptor {
        name: "Expressvu, North America",
        alias: "DBS",
        lowfreq: 11250,
        highfreq: 0,
        rangeswitch: 0,
        freqrange: &[FreqRange { low: 12200, high: 12700 }],
    },
    LnbDescriptor {
        name: "Standard",
        alias: "STANDARD",
        lowfreq: 10000,
        highfreq: 0,
        rangeswitch: 0,
        freqrange: &[FreqRange { low: 10945, high: 11450 }],
    },
    LnbDescriptor {
        name: "Astra",
        alias: "ENHANCED",
        lowfreq: 9750,
        highfreq: 0,
        rangeswitch: 0,
        freqrange: &[FreqRange { low: 10700, high: 11700 }],
    },
    LnbDescriptor {
        name: "Big Dish - Monopoint LNBf",
        alias: "C-BAND",
        lowfreq: 5150,
        highfreq: 0,
        rangeswitch: 0,
        freqrange: &[FreqRange { low: 3700, high: 4200 }],
    },
    LnbDescriptor {
        name: "Big Dish - Multipoint LNBf",
        alias: "C-MULT",
        lowfreq: 5150,
        highfreq: 5750,
        rangeswitch: 0,
        freqrange: &[FreqRange { low: 3700, high: 4200 }],
    },
    LnbDescriptor {
        name: "DishPro LNBf",
        alias: "DISHPRO",
        lowfreq: 11250,
        highfreq: 14350,
        rangeswitch: 0,
        freqrange: &[FreqRange { low: 12200, high: 12700 }],
    },
];

/// All built-in LNBs.
pub fn builtin_lnbs() -> &'static [LnbDescriptor] {
    &LNBS
}

/// Case-insensitive lookup by alias, then by full name.
pub fn find_lnb(name: &str) -> Option<&'static LnbDescriptor> {
    LNBS.iter()
        .find(|lnb| lnb.alias.eq_ignore_ascii_case(name))
        .or_else(|| LNBS.iter().find(|lnb| lnb.name.eq_ignore_ascii_case(name)))
}
