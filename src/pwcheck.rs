//! Password strength estimate for the form meter
//!
//! A local heuristic only: length and character-class variety, with a
//! penalty when the password contains the username. The wizard never
//! enforces a minimum strength; the meter is advisory.

/// Strength estimate shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strength {
    /// In `0.0..=1.0`, drives the meter width.
    pub fraction: f64,
    /// Short label rendered next to the meter.
    pub label: &'static str,
}

impl Strength {
    fn empty() -> Self {
        Strength {
            fraction: 0.0,
            label: "",
        }
    }
}

/// Estimate the strength of `password`, penalizing passwords that contain
/// the username.
pub fn estimate(password: &str, username: Option<&str>) -> Strength {
    if password.is_empty() {
        return Strength::empty();
    }

    let length_score = (password.chars().count().min(16) as f64) / 16.0;

    let classes = [
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .iter()
    .filter(|&&present| present)
    .count();
    let class_score = classes as f64 / 4.0;

    let mut fraction = 0.6 * length_score + 0.4 * class_score;

    if let Some(user) = username {
        if !user.is_empty()
            && password.to_ascii_lowercase().contains(&user.to_ascii_lowercase())
        {
            fraction /= 2.0;
        }
    }

    let label = match fraction {
        f if f < 0.25 => "Weak",
        f if f < 0.50 => "Fair",
        f if f < 0.75 => "Good",
        _ => "Strong",
    };

    Strength { fraction, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_password_has_no_label() {
        let s = estimate("", None);
        assert_eq!(s.fraction, 0.0);
        assert_eq!(s.label, "");
    }

    #[test]
    fn test_fraction_in_bounds() {
        for pw in ["a", "Password1!", "x".repeat(64).as_str()] {
            let s = estimate(pw, None);
            assert!((0.0..=1.0).contains(&s.fraction), "{} out of bounds", pw);
        }
    }

    #[test]
    fn test_variety_beats_repetition() {
        let plain = estimate("aaaaaaaa", None);
        let varied = estimate("aA1!aA1!", None);
        assert!(varied.fraction > plain.fraction);
    }

    #[test]
    fn test_username_penalty() {
        let with_user = estimate("alice1234", Some("alice"));
        let without = estimate("alice1234", None);
        assert!(with_user.fraction < without.fraction);
    }

    #[test]
    fn test_username_penalty_is_case_insensitive() {
        let s1 = estimate("Alice1234", Some("alice"));
        let s2 = estimate("Alice1234", Some("xyzzy"));
        assert!(s1.fraction < s2.fraction);
    }

    #[test]
    fn test_long_varied_password_is_strong() {
        let s = estimate("correct-Horse-battery-4", None);
        assert_eq!(s.label, "Strong");
    }
}
