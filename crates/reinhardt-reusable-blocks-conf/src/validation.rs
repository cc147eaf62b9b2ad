//! Settings validation

use crate::{ReusableBlocksSettings, SettingsError};

/// Validate every field of the settings
pub fn validate(settings: &ReusableBlocksSettings) -> Result<(), SettingsError> {
	validate_attribute("slot_attribute", &settings.slot_attribute)?;
	validate_attribute("slot_label_attribute", &settings.slot_label_attribute)?;

	if settings.slot_attribute == settings.slot_label_attribute {
		return Err(SettingsError::Validation(format!(
			"slot_attribute and slot_label_attribute must differ, both are '{}'",
			settings.slot_attribute
		)));
	}

	if settings.max_nesting_depth < 1 {
		return Err(SettingsError::Validation(
			"max_nesting_depth must be at least 1".to_string(),
		));
	}

	if !settings.render_timeout_secs.is_finite() || settings.render_timeout_secs <= 0.0 {
		return Err(SettingsError::Validation(format!(
			"render_timeout_secs must be a positive number of seconds, got {}",
			settings.render_timeout_secs
		)));
	}

	if !settings.api_prefix.starts_with('/') {
		return Err(SettingsError::Validation(format!(
			"api_prefix must start with '/', got '{}'",
			settings.api_prefix
		)));
	}

	for block_type in &settings.block_types {
		if !is_identifier(block_type) {
			return Err(SettingsError::Validation(format!(
				"block type '{}' is not a valid identifier",
				block_type
			)));
		}
	}

	Ok(())
}

fn validate_attribute(field: &str, value: &str) -> Result<(), SettingsError> {
	if value.is_empty() {
		return Err(SettingsError::Validation(format!("{} cannot be empty", field)));
	}
	if value.chars().any(|c| c.is_whitespace()) {
		return Err(SettingsError::Validation(format!(
			"{} cannot contain whitespace: '{}'",
			field, value
		)));
	}
	// The markup parser lowercases attribute names
	if value.chars().any(|c| c.is_uppercase()) {
		return Err(SettingsError::Validation(format!(
			"{} must be lowercase: '{}'",
			field, value
		)));
	}
	Ok(())
}

fn is_identifier(value: &str) -> bool {
	let mut chars = value.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
		_ => return false,
	}
	chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case::empty_slot_attribute(ReusableBlocksSettings { slot_attribute: String::new(), ..Default::default() })]
	#[case::whitespace_attribute(ReusableBlocksSettings { slot_attribute: "data slot".to_string(), ..Default::default() })]
	#[case::uppercase_attribute(ReusableBlocksSettings { slot_label_attribute: "Data-Label".to_string(), ..Default::default() })]
	#[case::same_attributes(ReusableBlocksSettings { slot_label_attribute: "data-slot".to_string(), ..Default::default() })]
	#[case::zero_depth(ReusableBlocksSettings { max_nesting_depth: 0, ..Default::default() })]
	#[case::zero_timeout(ReusableBlocksSettings { render_timeout_secs: 0.0, ..Default::default() })]
	#[case::nan_timeout(ReusableBlocksSettings { render_timeout_secs: f64::NAN, ..Default::default() })]
	#[case::relative_prefix(ReusableBlocksSettings { api_prefix: "blocks".to_string(), ..Default::default() })]
	#[case::bad_block_type(ReusableBlocksSettings { block_types: vec!["rich-text".to_string()], ..Default::default() })]
	fn test_invalid_settings_are_rejected(#[case] settings: ReusableBlocksSettings) {
		// Act
		let result = validate(&settings);

		// Assert
		assert!(matches!(result, Err(SettingsError::Validation(_))));
	}

	#[rstest]
	fn test_empty_block_types_are_valid() {
		// Arrange
		let settings = ReusableBlocksSettings {
			block_types: Vec::new(),
			..Default::default()
		};

		// Act & Assert
		assert!(validate(&settings).is_ok());
	}

	#[rstest]
	#[case("rich_text", true)]
	#[case("_private", true)]
	#[case("h2", true)]
	#[case("2col", false)]
	#[case("", false)]
	fn test_is_identifier(#[case] value: &str, #[case] expected: bool) {
		assert_eq!(is_identifier(value), expected);
	}
}
