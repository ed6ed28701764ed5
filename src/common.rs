pub mod error;
pub mod i18n;

#[cfg(test)]
pub mod test_support;
