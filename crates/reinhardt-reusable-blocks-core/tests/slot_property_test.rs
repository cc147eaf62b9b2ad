//! Property-based tests for slot scanning and composition

use proptest::prelude::*;
use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
use reinhardt_reusable_blocks_core::prelude::*;
use std::sync::Arc;

fn wrapper_tag() -> impl Strategy<Value = &'static str> {
	prop_oneof![Just("div"), Just("section"), Just("span"), Just("aside"), Just("p")]
}

proptest! {
	#[test]
	fn prop_scan_finds_every_marked_element_in_document_order(
		ids in proptest::collection::vec("([a-z][a-z0-9_]{0,11})?", 0..12),
		tags in proptest::collection::vec(wrapper_tag(), 12),
		filler in "[A-Za-z ]{0,20}",
	) {
		// Arrange
		let mut markup = String::from("<main>");
		for (index, id) in ids.iter().enumerate() {
			let tag = tags[index];
			markup.push_str(&format!("<{tag}>{filler}</{tag}><div data-slot=\"{id}\"><em>{filler}</em></div>"));
		}
		markup.push_str("</main><footer>end</footer>");
		let scanner = SlotScanner::new(&ReusableBlocksSettings::default());

		// Act
		let slots = scanner.scan(&markup);

		// Assert
		prop_assert_eq!(slots.len(), ids.len());
		let found: Vec<String> = slots.into_iter().map(|s| s.slot_id).collect();
		prop_assert_eq!(found, ids);
	}

	#[test]
	fn prop_scan_is_deterministic(markup in ".{0,200}") {
		// Arrange
		let scanner = SlotScanner::new(&ReusableBlocksSettings::default());

		// Act
		let first = scanner.scan(&markup);
		let second = scanner.scan(&markup);

		// Assert
		prop_assert_eq!(first, second);
	}

	#[test]
	fn prop_render_is_idempotent(
		defaults in proptest::collection::vec("[a-z ]{0,10}", 1..6),
		filled in proptest::collection::vec(any::<bool>(), 6),
	) {
		// Arrange
		let store = Arc::new(InMemoryDocumentStore::new());
		let mut content = StreamField::new();
		let mut fills = SlotFills::new();
		for (index, default) in defaults.iter().enumerate() {
			let slot_id = format!("slot_{index}");
			content.push(ContentBlock::slot(
				SlotPlaceholder::new(slot_id.clone())
					.with_default(StreamField::new().add_block(ContentBlock::rich_text(default.clone()))),
			));
			if filled[index] {
				fills.insert(
					slot_id,
					StreamField::new().add_block(ContentBlock::rich_text(format!("<b>fill {index}</b>"))),
				);
			}
		}
		let layout = store.create("Layout", content).unwrap();
		let compositor = SlotCompositor::new(store, &ReusableBlocksSettings::default());

		// Act
		let first = compositor.render(layout.id, &fills).unwrap();
		let second = compositor.render(layout.id, &fills).unwrap();

		// Assert
		prop_assert_eq!(&first, &second);
		for index in 0..defaults.len() {
			let marker = format!("<b>fill {index}</b>");
			prop_assert_eq!(first.contains(&marker), filled[index]);
		}
	}

	#[test]
	fn fuzz_arbitrary_fill_markup_never_panics(fill in ".{0,120}") {
		// Arrange
		let store = Arc::new(InMemoryDocumentStore::new());
		let layout = store
			.create("Layout", StreamField::new().add_block(ContentBlock::slot(SlotPlaceholder::new("main"))))
			.unwrap();
		let compositor = SlotCompositor::new(store, &ReusableBlocksSettings::default());
		let fills = SlotFills::new().with("main", StreamField::new().add_block(ContentBlock::raw_html(fill)));

		// Act
		let result = compositor.render(layout.id, &fills);

		// Assert
		prop_assert!(result.is_ok());
	}
}
