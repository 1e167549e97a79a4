use regex::Regex;

const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

fn float_prefix() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
            .expect("float prefix pattern is valid")
    })
}

/// Lenient float conversion used while text is still being typed. Leading whitespace is skipped
/// and the longest numeric prefix is read, so `"5abc"` is 5.0. Anything without a numeric prefix
/// is NaN; this never fails.
pub fn parse_float_or_nan(s: &str) -> f64 {
    let s = s.trim_start();
    match float_prefix().find(s) {
        None => f64::NAN,
        Some(m) => {
            let token = m.as_str();
            match token.trim_start_matches(|c| c == '+' || c == '-') {
                "Infinity" => if token.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY },
                _ => token.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
    }
}

pub fn sums_to_one(p: &[f64]) -> bool {
    (p.iter().sum::<f64>() - 1.0).abs() <= PROBABILITY_SUM_TOLERANCE
}
