//! Structural guarantees that hold whatever sequence of edits is applied

use listflow_engine::editing::snapshot::{flatten, is_well_formed, nest};
use listflow_engine::editing::{ItemNode, ListNode, SequenceIds, SplitDirection, TreeNode};
use listflow_engine::models::{Block, ListKind, ListType, Position, Selection};
use listflow_engine::{Cmd, Document, Fragment, io};
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;
use common::{assert_well_formed, doc, lines, render};

/// Small deterministic generator so failures replay exactly
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as usize
    }

    fn below(&mut self, bound: usize) -> usize {
        self.next() % bound.max(1)
    }

    fn position(&mut self, doc: &Document) -> Position {
        let block = self.below(doc.len());
        let offset = self.below(doc.blocks()[block].len() + 1);
        Position::new(block, offset)
    }
}

fn pasted(rng: &mut Lcg) -> Fragment {
    let sources: [&[&str]; 4] = [
        &["* x"],
        &["* x", "  * y", "z"],
        &["# x", "  more", "    [ ] y"],
        &["<rule>", "* x"],
    ];
    let source = sources[rng.below(sources.len())];
    Fragment::new(io::parse(&source.join("\n")).unwrap().blocks)
}

fn random_command(rng: &mut Lcg, doc: &Document) -> Cmd {
    let kinds = [ListKind::Bulleted, ListKind::Numbered, ListKind::Checkable];
    match rng.below(11) {
        0 => Cmd::Indent { blocks: None },
        1 => Cmd::Outdent { blocks: None },
        2 | 3 => Cmd::Enter,
        4 => Cmd::SplitItem {
            direction: SplitDirection::Before,
            blocks: None,
        },
        5 => Cmd::SplitItem {
            direction: SplitDirection::After,
            blocks: None,
        },
        6 => Cmd::RemoveList { blocks: None },
        7 => Cmd::SetListType {
            kind: kinds[rng.below(kinds.len())],
            blocks: None,
        },
        8 => Cmd::ToggleChecked { blocks: None },
        9 => Cmd::DeleteRange {
            range: Selection::range(rng.position(doc), rng.position(doc)),
        },
        _ => Cmd::InsertContent {
            fragment: pasted(rng),
            at: None,
        },
    }
}

#[rstest]
#[case::flat_list(&["* a", "* b", "* c", "* d"], 1)]
#[case::nested_list(&["* a", "  # b", "    * c", "  # d", "* e"], 2)]
#[case::mixed_content(&["intro", "* a", "  a2", "<table>", "[ ] t", "  [x] u", "outro"], 3)]
#[case::multi_block_items(&["# a", "  b", "  * c", "    d", "  e", "# f"], 4)]
#[case::plain_text(&["one", "two", "three"], 5)]
fn test_random_edits_keep_structure(#[case] input: &[&str], #[case] seed: u64) {
    let mut rng = Lcg(seed);
    let mut doc = doc(input);
    for step in 0..200 {
        let selection = if rng.below(3) == 0 {
            Selection::range(rng.position(&doc), rng.position(&doc))
        } else {
            Selection::collapsed(rng.position(&doc))
        };
        doc.set_selection(selection);
        let cmd = random_command(&mut rng, &doc);
        let before = render(&doc);
        doc.apply(cmd.clone());

        assert_well_formed(doc.blocks());
        let version = doc.version();
        assert!(
            doc.normalize().is_empty(),
            "step {step}: fixer not settled after {cmd:?} on\n{before}"
        );
        assert_eq!(doc.version(), version);

        let tree = nest(doc.blocks());
        assert!(is_well_formed(&tree), "step {step}: malformed tree after {cmd:?}");
        let mut unused = SequenceIds::new("unused-");
        assert_eq!(flatten(&tree, &mut unused), doc.blocks());
    }
}

#[rstest]
#[case::jumps_in_depth(&["* a", "      * b", "    * c"])]
#[case::starts_deep(&["    * a", "  * b", "p", "  * c"])]
#[case::reused_ids(&["* a {id:x}", "* b {id:y}", "* c {id:x}", "  # d {id:x}"])]
#[case::mixed_types_in_item(&["* a {id:x}", "  # b {id:x}", "[x] c {id:x}"])]
fn test_fixer_is_idempotent(#[case] input: &[&str]) {
    let mut doc = doc(input);
    doc.normalize();
    let once = doc.blocks().to_vec();
    assert_well_formed(&once);
    assert!(doc.normalize().is_empty());
    assert_eq!(doc.blocks(), once.as_slice());
}

#[test]
fn test_tree_survives_flattening() {
    let tree = vec![
        TreeNode::Block(Block::paragraph("intro")),
        TreeNode::List(
            ListNode::new(ListKind::Bulleted)
                .with_item(
                    ItemNode::new(Some("a".into()))
                        .with_block(Block::paragraph("a"))
                        .with_list(
                            ListNode::new(ListKind::Checkable)
                                .with_item(
                                    ItemNode::new(Some("t".into()))
                                        .checked(true)
                                        .with_block(Block::paragraph("done")),
                                ),
                        )
                        .with_block(Block::paragraph("a2")),
                )
                .with_item(ItemNode::new(Some("b".into())).with_block(Block::paragraph("b"))),
        ),
        TreeNode::Block(Block::object("table")),
        TreeNode::List(
            ListNode::new(ListKind::Numbered)
                .with_item(ItemNode::new(Some("n".into())).with_block(Block::paragraph("n"))),
        ),
    ];
    assert!(is_well_formed(&tree));
    let flat = flatten(&tree, &mut SequenceIds::default());
    assert_eq!(
        flat[2],
        Block::list_item("done", ListType::Checkable { checked: true }, 1, "t")
    );
    assert_eq!(nest(&flat), tree);
}

#[test]
fn test_outdent_of_only_empty_item_leaves_plain_block() {
    let mut doc = doc(&["* []"]);
    doc.apply(Cmd::Outdent { blocks: None });
    assert_eq!(doc.blocks(), &[Block::paragraph("")]);
}

#[test]
fn test_snapshot_after_indent() {
    let mut doc = doc(&["* a", "  # b", "* c[]"]);
    doc.apply(Cmd::Indent { blocks: None });
    insta::assert_snapshot!(doc.snapshot().to_string(), @r###"
    bulleted
      item 000
        paragraph "a"
        numbered
          item 001
            paragraph "b"
          item 002
            paragraph "c"
    "###);
    assert_eq!(render(&doc), lines(&["* a", "  # b", "  # c[]"]));
}

#[test]
fn test_snapshot_after_removing_middle_item() {
    let mut doc = doc(&["* a", "* [b]", "  * c", "    * d", "[ ] e"]);
    doc.apply(Cmd::RemoveList { blocks: None });
    insta::assert_snapshot!(doc.snapshot().to_string(), @r###"
    bulleted
      item 000
        paragraph "a"
    paragraph "b"
    bulleted
      item 002
        paragraph "c"
        bulleted
          item 003
            paragraph "d"
    checkable
      item 004 [ ]
        paragraph "e"
    "###);
}
