//! Slot discovery in rendered markup

use crate::markup::{self, MarkupFragment};
use markup5ever_rcdom::Handle;
use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
use std::collections::HashSet;

/// A slot found in markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
	/// Value of the slot marker attribute
	pub slot_id: String,
	/// Label attribute, or the slot id when absent
	pub label: String,
	/// Markup inside the slot element
	pub default_markup: String,
}

impl SlotInfo {
	/// Whether the slot element has any inner markup
	pub fn has_default(&self) -> bool {
		!self.default_markup.is_empty()
	}

	/// Whether a fill can target this slot
	///
	/// An empty or blank id is reported by the scanner but never matched.
	pub fn is_fillable(&self) -> bool {
		!self.slot_id.trim().is_empty()
	}
}

/// A slot together with its element in a parsed fragment
pub struct ScannedSlot {
	/// Slot details
	pub info: SlotInfo,
	/// Element carrying the slot marker
	pub element: Handle,
}

/// Finds elements carrying the slot marker attribute
///
/// # Examples
///
/// ```
/// use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
/// use reinhardt_reusable_blocks_core::scanner::SlotScanner;
///
/// let scanner = SlotScanner::new(&ReusableBlocksSettings::default());
/// let slots = scanner.scan(
///     r#"<header data-slot="header" data-slot-label="Header">H</header><footer data-slot="footer"></footer>"#,
/// );
///
/// assert_eq!(slots.len(), 2);
/// assert_eq!(slots[0].label, "Header");
/// assert_eq!(slots[1].label, "footer");
/// assert!(!slots[1].has_default());
/// ```
#[derive(Debug, Clone)]
pub struct SlotScanner {
	slot_attribute: String,
	slot_label_attribute: String,
}

impl SlotScanner {
	/// Scanner using the slot attributes named in `settings`
	pub fn new(settings: &ReusableBlocksSettings) -> Self {
		Self {
			slot_attribute: settings.slot_attribute.clone(),
			slot_label_attribute: settings.slot_label_attribute.clone(),
		}
	}

	/// Slots in `markup`, in document order
	///
	/// Malformed markup is repaired by the parser; whatever slots survive
	/// are reported. Every marked element is reported, including repeated
	/// and empty ids.
	pub fn scan(&self, markup: &str) -> Vec<SlotInfo> {
		let fragment = MarkupFragment::parse(markup);
		self.scan_fragment(&fragment)
			.into_iter()
			.map(|slot| slot.info)
			.collect()
	}

	/// Slots of an already parsed fragment, with their elements
	pub fn scan_fragment(&self, fragment: &MarkupFragment) -> Vec<ScannedSlot> {
		let mut slots = Vec::new();
		let mut seen: HashSet<String> = HashSet::new();
		let mut warned: HashSet<String> = HashSet::new();

		for element in fragment.elements_with_attribute(&self.slot_attribute) {
			let Some(slot_id) = markup::attribute_value(&element, &self.slot_attribute) else {
				continue;
			};
			if !slot_id.trim().is_empty()
				&& !seen.insert(slot_id.clone())
				&& warned.insert(slot_id.clone())
			{
				tracing::warn!(slot_id = %slot_id, "duplicate slot id in layout markup");
			}

			let label = markup::attribute_value(&element, &self.slot_label_attribute)
				.filter(|label| !label.is_empty())
				.unwrap_or_else(|| slot_id.clone());
			let default_markup = markup::inner_markup(&element).unwrap_or_else(|e| {
				tracing::warn!(slot_id = %slot_id, error = %e, "could not serialize slot default");
				String::new()
			});

			slots.push(ScannedSlot {
				info: SlotInfo {
					slot_id,
					label,
					default_markup,
				},
				element,
			});
		}

		slots
	}
}
