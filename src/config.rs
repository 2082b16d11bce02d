use std::env;
use std::fmt::Debug;
use std::str::FromStr;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Returns the parsed value of the named environment variable, or
/// `default` if it isn't set. Panics if it is set but can't be parsed.
pub fn get_variable_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("parse {} environment variable: {:?}", name, e)),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::get_variable_or;

    #[test]
    fn falls_back_when_unset() {
        let value: usize = get_variable_or("IRONLOG_TEST_SURELY_UNSET_VARIABLE", 30);

        assert_eq!(value, 30);
    }

    #[test]
    fn parses_when_set() {
        std::env::set_var("IRONLOG_TEST_WINDOW", " 14 ");

        let value: usize = get_variable_or("IRONLOG_TEST_WINDOW", 30);

        assert_eq!(value, 14);
    }
}
