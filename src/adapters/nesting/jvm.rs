use crate::domain::model::Nesting;
use crate::domain::ports::NestingDetector;

/// JVM binary-name conventions
///
/// Conventions:
/// - `Outer$1`, `Outer$1Local`: anonymous, local
/// - `$lambda`, `$$`, `access$`: compiler-generated
/// - `Outer$Inner`: member
pub struct JvmNestingDetector;

const SYNTHETIC_MARKERS: &[&str] = &["$lambda", "$$", "access$", "$WhenMappings"];

impl NestingDetector for JvmNestingDetector {
    fn detect(&self, type_name: &str) -> Nesting {
        if SYNTHETIC_MARKERS.iter().any(|m| type_name.contains(m)) {
            return Nesting::Synthetic;
        }
        let simple = type_name.rsplit('.').next().unwrap_or(type_name);
        let Some((_, last)) = simple.rsplit_once('$') else {
            return Nesting::TopLevel;
        };

        let digits = last.chars().take_while(char::is_ascii_digit).count();
        match (digits, last.len()) {
            (0, 0) => Nesting::Synthetic,
            (0, _) => Nesting::Member,
            (d, len) if d == len => Nesting::Anonymous,
            _ => Nesting::Local,
        }
    }
}
