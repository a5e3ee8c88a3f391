use listflow_engine::editing::{ItemNode, ListCommand, ListNode, TreeNode};
use listflow_engine::models::{Block, InsertionPoint, ListKind, ListType};
use listflow_engine::{Cmd, Fragment, HostEvent, io};
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;
use common::{assert_well_formed, doc, lines, render};

fn fragment(lines: &[&str]) -> Fragment {
    Fragment::new(io::parse(&lines.join("\n")).unwrap().blocks)
}

fn paste(input: &[&str], pasted: Fragment, at: Option<InsertionPoint>) -> String {
    let mut doc = doc(input);
    let patch = doc.apply(Cmd::InsertContent {
        fragment: pasted,
        at,
    });
    assert_eq!(patch.executed, Some(ListCommand::InsertContent));
    assert_well_formed(doc.blocks());
    render(&doc)
}

#[rstest]
#[case::single_item_inline(&["* A", "  * B[]", "    * C"], &["* X"], &["* A", "  * BX[]", "    * C"])]
#[case::nested_items_follow_cursor_depth(
    &["* A", "  * B[]", "    * C"],
    &["* X", "  * Y"],
    &["* A", "  * BX", "    * Y[] {id:a00}", "    * C {id:002}"]
)]
#[case::paragraph_resets_depth(
    &["* A", "  * B[]", "    * C"],
    &["* W", "  * X", "Y", "* Z"],
    &["* A", "  * BW", "    * X {id:a00}", "Y", "* Z[] {id:a01}", "  * C {id:002}"]
)]
#[case::leading_paragraph_joins_cursor_block(
    &["* A", "  * B[]", "    * C"],
    &["X", "* Y"],
    &["* A", "  * BX", "* Y[] {id:a00}", "  * C {id:002}"]
)]
#[case::top_level_list(
    &["* A[]", "  * B"],
    &["* X", "  * Y"],
    &["* AX", "  * Y[] {id:a00}", "  * B {id:001}"]
)]
#[case::outside_any_list(&["A[]", "B"], &["* X", "  * Y"], &["AX", "* Y[] {id:a00}", "B"])]
#[case::multi_block_nested_item(
    &["* A", "  * B[]", "    * C"],
    &["* W", "  * X", "    Y", "    Z"],
    &["* A", "  * BW", "    * X {id:a00}", "      Y", "      Z[]", "    * C {id:002}"]
)]
#[case::multi_block_first_item(
    &["* A[]", "  * B", "    * C"],
    &["* W", "  X", "  Y", "* Z"],
    &["* AW", "* X {id:a00}", "  Y", "* Z[] {id:a01}", "  * B {id:001}", "    * C {id:002}"]
)]
fn test_paste_at_cursor(#[case] input: &[&str], #[case] pasted: &[&str], #[case] expected: &[&str]) {
    assert_eq!(paste(input, fragment(pasted), None), lines(expected));
}

#[rstest]
#[case::after_nested_item(
    &["* A", "  * B", "    * C"],
    2,
    &["* X", "  * Y"],
    &["* A", "  * B", "  * X {id:a00}", "    * Y[] {id:a01}", "    * C {id:002}"]
)]
#[case::item_without_parent(
    &["Foo", "# A", "  # B", "Bar"],
    3,
    &["* X"],
    &["Foo", "# A", "  # B", "  * X[] {id:a00}", "Bar"]
)]
#[case::item_with_child_without_parent(
    &["Foo", "# A", "  # B", "Bar"],
    3,
    &["* X", "  * Y"],
    &["Foo", "# A", "  # B", "  * X {id:a00}", "    * Y[] {id:a01}", "Bar"]
)]
fn test_paste_between_blocks(
    #[case] input: &[&str],
    #[case] index: usize,
    #[case] pasted: &[&str],
    #[case] expected: &[&str],
) {
    let at = Some(InsertionPoint::BetweenBlocks(index));
    assert_eq!(paste(input, fragment(pasted), at), lines(expected));
}

#[test]
fn test_object_in_pasted_item_splits_it() {
    let pasted = Fragment::new(vec![
        Block::list_item("a", ListType::Bulleted, 0, "x"),
        Block::object("split"),
        Block::list_item("b", ListType::Bulleted, 0, "x"),
    ]);
    assert_eq!(
        paste(&["* A[]", "  * B", "    * C"], pasted, None),
        lines(&["* Aa", "<split>", "* b[] {id:a00}", "  * B {id:001}", "    * C {id:002}"])
    );
}

#[test]
fn test_paste_over_range_replaces_it() {
    assert_eq!(
        paste(&["* A[B", "* C]D"], fragment(&["* X"]), None),
        lines(&["* AX[]D"])
    );
}

#[test]
fn test_paste_tree_without_ids_into_nested_item() {
    let tree = vec![TreeNode::List(
        ListNode::new(ListKind::Bulleted).with_item(
            ItemNode::new(None)
                .with_block(Block::paragraph("X"))
                .with_list(
                    ListNode::new(ListKind::Bulleted)
                        .with_item(ItemNode::new(None).with_block(Block::paragraph("Y"))),
                ),
        ),
    )];
    let pasted = Fragment::from_tree(&tree);
    assert_eq!(pasted.blocks.len(), 2);
    assert_eq!(
        paste(&["* A", "  * []"], pasted, None),
        lines(&["* A", "  * X", "    * Y[] {id:a00}"])
    );
}

#[test]
fn test_empty_fragment_changes_nothing() {
    let mut doc = doc(&["[]"]);
    let patch = doc.apply(Cmd::InsertContent {
        fragment: Fragment::default(),
        at: None,
    });
    assert!(patch.is_noop());
    assert_eq!(patch.version, 0);
    assert_eq!(render(&doc), lines(&["[]"]));
}

#[test]
fn test_host_inserted_blocks_are_reconciled() {
    let mut doc = doc(&["* A", "  * B", "* X {id:000}", "  * Y {id:001}", "    * C"]);
    let patch = doc.handle(HostEvent::ContentInserted { blocks: 2..4 });
    assert_eq!(patch.executed, Some(ListCommand::InsertContent));
    assert_eq!(patch.changed.len(), 2);
    assert_eq!(
        render(&doc),
        lines(&["* A", "  * B", "  * X {id:a00}", "    * Y[] {id:a01}", "    * C"])
    );
}
