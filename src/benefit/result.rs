//! Benefit calculation output

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Keys of a [`BenefitResult`], in display order
pub const RESULT_KEYS: [&str; 7] = [
    "fas",
    "fas_next_year",
    "accrued_benefit",
    "pvab",
    "accrued_benefit_next_year",
    "pvab_next_year",
    "pvab_increase",
];

/// Dollar amounts produced for one member
///
/// Serializes to a flat map with exactly the keys in [`RESULT_KEYS`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BenefitResult {
    /// Final average salary today
    pub fas: f64,
    /// Final average salary projected one year forward
    pub fas_next_year: f64,
    /// Annual benefit accrued to date
    pub accrued_benefit: f64,
    /// Present value of the accrued benefit
    pub pvab: f64,
    /// Accrued benefit after one more year of service (at today's FAS)
    pub accrued_benefit_next_year: f64,
    pub pvab_next_year: f64,
    pub pvab_increase: f64,
}

impl BenefitResult {
    /// `(key, label, value)` for every field, in [`RESULT_KEYS`] order
    pub fn entries(&self) -> [(&'static str, &'static str, f64); 7] {
        [
            ("fas", "Final Average Salary", self.fas),
            ("fas_next_year", "Final Average Salary (next year)", self.fas_next_year),
            ("accrued_benefit", "Accrued Benefit", self.accrued_benefit),
            ("pvab", "Present Value of Accrued Benefit", self.pvab),
            (
                "accrued_benefit_next_year",
                "Accrued Benefit (next year)",
                self.accrued_benefit_next_year,
            ),
            ("pvab_next_year", "PVAB (next year)", self.pvab_next_year),
            ("pvab_increase", "PVAB Increase", self.pvab_increase),
        ]
    }

    /// Value by key, `None` for unknown keys
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, _, v)| v)
    }

    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        self.entries().into_iter().map(|(k, _, v)| (k, v)).collect()
    }
}

impl fmt::Display for BenefitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, label, value) in self.entries() {
            writeln!(f, "{:<36} {:>16}", label, format_currency(value))?;
        }
        Ok(())
    }
}

/// Format a dollar amount as `$1,234.56` (`-$1,234.56` when negative)
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}
