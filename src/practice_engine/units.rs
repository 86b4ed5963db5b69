//! Unit/factor resolution between named units.
//!
//! Only forward factors are stored, keyed `"<from>_to_<to>"`. Reverse factors
//! are reciprocals computed on demand. Lookup order is exact-forward,
//! exact-reverse, approximate-forward, approximate-reverse.

use crate::practice_engine::errors::ConversionError;

/// Exact metric and time factors.
const EXACT_FACTORS: &[(&str, f64)] = &[
    // length
    ("km_to_m", 1_000.0),
    ("m_to_cm", 100.0),
    ("cm_to_mm", 10.0),
    ("m_to_mm", 1_000.0),
    ("km_to_cm", 100_000.0),
    ("km_to_mm", 1_000_000.0),
    // mass
    ("kg_to_g", 1_000.0),
    ("g_to_mg", 1_000.0),
    ("kg_to_mg", 1_000_000.0),
    // capacity
    ("l_to_ml", 1_000.0),
    ("l_to_cl", 100.0),
    ("cl_to_ml", 10.0),
    // time
    ("hours_to_minutes", 60.0),
    ("minutes_to_seconds", 60.0),
    ("hours_to_seconds", 3_600.0),
    ("days_to_hours", 24.0),
    ("weeks_to_days", 7.0),
    ("years_to_months", 12.0),
];

/// Imperial to metric, using the rounded constants taught in primary school.
const APPROXIMATE_FACTORS: &[(&str, f64)] = &[
    ("miles_to_km", 1.6),
    ("inches_to_cm", 2.5),
    ("feet_to_cm", 30.0),
    ("yards_to_m", 1.0),
    ("ounces_to_g", 30.0),
    ("pounds_to_g", 450.0),
    ("pounds_to_kg", 0.45),
    ("stone_to_kg", 6.5),
    ("pints_to_ml", 600.0),
    ("pints_to_l", 0.6),
    ("gallons_to_l", 4.5),
];

/// A resolved factor plus where it came from (used for hint wording).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedFactor {
    pub value: f64,
    /// Came from the approximate (imperial) table.
    pub approximate: bool,
    /// Computed as the reciprocal of a stored forward entry.
    pub reversed: bool,
}

impl ResolvedFactor {
    /// Converting to a smaller unit (factor ≥ 1).
    pub fn is_larger_to_smaller(&self) -> bool {
        self.value >= 1.0
    }
}

fn lookup(table: &[(&str, f64)], from: &str, to: &str) -> Option<f64> {
    table
        .iter()
        .find(|(key, _)| split_pair(key) == Some((from, to)))
        .map(|&(_, factor)| factor)
}

/// Split `"km_to_m"` into `("km", "m")`.
pub fn split_pair(name: &str) -> Option<(&str, &str)> {
    let (from, to) = name.split_once("_to_")?;
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from, to))
}

/// Resolve the multiplier that converts a quantity in `from` into `to`.
pub fn resolve(from: &str, to: &str) -> Result<ResolvedFactor, ConversionError> {
    let hit = |value: f64, approximate: bool, reversed: bool| -> Result<ResolvedFactor, ConversionError> {
        Ok(ResolvedFactor { value, approximate, reversed })
    };

    if let Some(f) = lookup(EXACT_FACTORS, from, to) {
        return hit(f, false, false);
    }
    if let Some(f) = lookup(EXACT_FACTORS, to, from) {
        return hit(1.0 / f, false, true);
    }
    if let Some(f) = lookup(APPROXIMATE_FACTORS, from, to) {
        return hit(f, true, false);
    }
    if let Some(f) = lookup(APPROXIMATE_FACTORS, to, from) {
        return hit(1.0 / f, true, true);
    }
    Err(ConversionError::UnknownConversion { from: from.to_string(), to: to.to_string() })
}

/// Positive multiplier from `from` to `to`, or `UnknownConversion`.
pub fn resolve_factor(from: &str, to: &str) -> Result<f64, ConversionError> {
    resolve(from, to).map(|r| r.value)
}

/// Resolve a conversion name of the form `"<from>_to_<to>"`.
pub fn resolve_named(name: &str) -> Result<ResolvedFactor, ConversionError> {
    let (from, to) = split_pair(name).ok_or_else(|| ConversionError::MalformedName(name.to_string()))?;
    resolve(from, to)
}

/// True when the conversion name resolves through either table.
pub fn is_known(name: &str) -> bool {
    resolve_named(name).is_ok()
}

/// Which family of quantity a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Length,
    Mass,
    Capacity,
    Time,
}

pub fn measure_of(unit: &str) -> Option<Measure> {
    match unit {
        "km" | "m" | "cm" | "mm" | "miles" | "inches" | "feet" | "yards" => Some(Measure::Length),
        "kg" | "g" | "mg" | "ounces" | "pounds" | "stone"                => Some(Measure::Mass),
        "l" | "cl" | "ml" | "pints" | "gallons"                          => Some(Measure::Capacity),
        "years" | "weeks" | "days" | "hours" | "minutes" | "seconds"     => Some(Measure::Time),
        _ => None,
    }
}

pub fn is_imperial(unit: &str) -> bool {
    matches!(unit, "miles" | "inches" | "feet" | "yards" | "ounces" | "pounds" | "stone" | "pints" | "gallons")
}

/// Display name for a unit, singular for exactly 1.
pub fn unit_name(unit: &str, value: f64) -> &str {
    let (singular, plural) = match unit {
        "km"      => ("kilometre", "kilometres"),
        "m"       => ("metre", "metres"),
        "cm"      => ("centimetre", "centimetres"),
        "mm"      => ("millimetre", "millimetres"),
        "kg"      => ("kilogram", "kilograms"),
        "g"       => ("gram", "grams"),
        "mg"      => ("milligram", "milligrams"),
        "l"       => ("litre", "litres"),
        "cl"      => ("centilitre", "centilitres"),
        "ml"      => ("millilitre", "millilitres"),
        "miles"   => ("mile", "miles"),
        "inches"  => ("inch", "inches"),
        "feet"    => ("foot", "feet"),
        "yards"   => ("yard", "yards"),
        "ounces"  => ("ounce", "ounces"),
        "pounds"  => ("pound", "pounds"),
        "stone"   => ("stone", "stone"),
        "pints"   => ("pint", "pints"),
        "gallons" => ("gallon", "gallons"),
        "years"   => ("year", "years"),
        "weeks"   => ("week", "weeks"),
        "days"    => ("day", "days"),
        "hours"   => ("hour", "hours"),
        "minutes" => ("minute", "minutes"),
        "seconds" => ("second", "seconds"),
        other     => (other, other),
    };
    if value == 1.0 { singular } else { plural }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn km_to_m_is_exact_forward() {
        assert_eq!(resolve_factor("km", "m"), Ok(1000.0));
        assert!(close(resolve_factor("m", "km").unwrap(), 0.001));
    }

    #[test]
    fn approximate_table_resolves_both_directions() {
        let fwd = resolve("miles", "km").unwrap();
        assert!(fwd.approximate && !fwd.reversed);
        assert_eq!(fwd.value, 1.6);

        let rev = resolve("km", "miles").unwrap();
        assert!(rev.approximate && rev.reversed);
        assert!(close(rev.value, 0.625));
    }

    #[test]
    fn exact_table_wins_over_approximate() {
        // yards_to_m is approximate only; m_to_cm is exact.
        let r = resolve("m", "cm").unwrap();
        assert!(!r.approximate);
    }

    #[test]
    fn every_stored_pair_is_invertible() {
        for (name, _) in EXACT_FACTORS.iter().chain(APPROXIMATE_FACTORS) {
            let (from, to) = split_pair(name).unwrap();
            let f = resolve_factor(from, to).unwrap();
            let r = resolve_factor(to, from).unwrap();
            assert!(close(f * r, 1.0), "{name}: {f} * {r} != 1");
        }
    }

    #[test]
    fn unknown_pairs_fail() {
        assert_eq!(
            resolve_factor("km", "kg"),
            Err(ConversionError::UnknownConversion { from: "km".into(), to: "kg".into() })
        );
        assert!(matches!(resolve_named("kilometres"), Err(ConversionError::MalformedName(_))));
        assert!(!is_known("furlongs_to_m"));
    }

    #[test]
    fn unit_names_pluralise() {
        assert_eq!(unit_name("km", 1.0), "kilometre");
        assert_eq!(unit_name("km", 2.5), "kilometres");
        assert_eq!(unit_name("stone", 3.0), "stone");
        assert_eq!(unit_name("feet", 1.0), "foot");
    }
}
