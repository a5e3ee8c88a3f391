use anyhow::{Context, Result, bail};
use listflow_config::{Config, IdStrategy};
use listflow_engine::editing::{SequenceIds, SplitDirection, UuidIds};
use listflow_engine::models::{ListKind, Position, Selection};
use listflow_engine::{Cmd, Document, io};
use std::path::PathBuf;
use std::{env, process};

/// One step of a batch run
#[derive(Debug, PartialEq)]
enum Step {
    Apply(Cmd),
    Select(Selection),
    Fix,
}

struct Args {
    file: PathBuf,
    steps: Vec<Step>,
    tree: bool,
    write: bool,
}

const USAGE: &str = "Usage: listflow-cli [--tree] [--write] <file> [command...]

Commands:
  select:B[.O][-B.O]   move the selection (block.offset)
  indent | outdent | enter | split | split-after | remove-list
  bulleted | numbered | checkable | toggle-checked | fix";

fn parse_position(text: &str) -> Result<Position> {
    let (block, offset) = text.split_once('.').unwrap_or((text, "0"));
    let block = block
        .parse()
        .with_context(|| format!("bad block index '{block}'"))?;
    let offset = offset
        .parse()
        .with_context(|| format!("bad offset '{offset}'"))?;
    Ok(Position::new(block, offset))
}

fn parse_step(word: &str) -> Result<Step> {
    if let Some(range) = word.strip_prefix("select:") {
        let selection = match range.split_once('-') {
            Some((anchor, focus)) => Selection::range(parse_position(anchor)?, parse_position(focus)?),
            None => Selection::collapsed(parse_position(range)?),
        };
        return Ok(Step::Select(selection));
    }
    let cmd = match word {
        "indent" => Cmd::Indent { blocks: None },
        "outdent" => Cmd::Outdent { blocks: None },
        "enter" => Cmd::Enter,
        "split" => Cmd::SplitItem {
            direction: SplitDirection::Before,
            blocks: None,
        },
        "split-after" => Cmd::SplitItem {
            direction: SplitDirection::After,
            blocks: None,
        },
        "remove-list" => Cmd::RemoveList { blocks: None },
        "bulleted" | "numbered" | "checkable" => {
            let kind = match word {
                "bulleted" => ListKind::Bulleted,
                "numbered" => ListKind::Numbered,
                _ => ListKind::Checkable,
            };
            Cmd::SetListType { kind, blocks: None }
        }
        "toggle-checked" => Cmd::ToggleChecked { blocks: None },
        "fix" => return Ok(Step::Fix),
        other => bail!("unknown command '{other}'"),
    };
    Ok(Step::Apply(cmd))
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut file = None;
    let mut steps = Vec::new();
    let mut tree = false;
    let mut write = false;
    for arg in args {
        match arg.as_str() {
            "--tree" => tree = true,
            "--write" => write = true,
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            word => steps.push(parse_step(word)?),
        }
    }
    let Some(file) = file else {
        bail!("no document given");
    };
    Ok(Args {
        file,
        steps,
        tree,
        write,
    })
}

fn run(args: Args, config: &Config) -> Result<Document> {
    let path = config.resolve_document(&args.file);
    let notation = io::load(&path)?;
    let mut doc = notation.into_document(UuidIds);
    if config.id_strategy == IdStrategy::Sequence {
        doc.set_id_source(SequenceIds::new(config.id_prefix.clone()));
    }

    for step in args.steps {
        match step {
            Step::Select(selection) => doc.set_selection(selection),
            Step::Fix => {
                let fixed = doc.normalize();
                log::info!("fix repaired {} block(s)", fixed.len());
            }
            Step::Apply(cmd) => {
                let patch = doc.apply(cmd);
                match patch.executed {
                    Some(command) => log::info!(
                        "{command:?} changed {} block(s), fixer repaired {}",
                        patch.changed.len(),
                        patch.fixed.len()
                    ),
                    None => log::info!("no list command ran (version {})", patch.version),
                }
            }
        }
    }

    if args.write {
        io::save(&path, &doc)?;
        log::info!("saved {}", path.display());
    }
    Ok(doc)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::debug!("no config at {}, using defaults", Config::config_path().display());
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let tree = args.tree;
    let doc = run(args, &config)?;
    print!("{}", io::format(doc.blocks(), Some(doc.selection())));
    if tree {
        println!();
        print!("{}", doc.snapshot());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("select:2", Selection::collapsed(Position::new(2, 0)))]
    #[case("select:1.3", Selection::collapsed(Position::new(1, 3)))]
    #[case("select:0.1-2.4", Selection::range(Position::new(0, 1), Position::new(2, 4)))]
    fn test_parse_select(#[case] word: &str, #[case] expected: Selection) {
        assert_eq!(parse_step(word).unwrap(), Step::Select(expected));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_step("enter").unwrap(), Step::Apply(Cmd::Enter));
        assert_eq!(parse_step("fix").unwrap(), Step::Fix);
        assert_eq!(
            parse_step("checkable").unwrap(),
            Step::Apply(Cmd::SetListType {
                kind: ListKind::Checkable,
                blocks: None,
            })
        );
        assert!(parse_step("frobnicate").is_err());
        assert!(parse_step("select:x.1").is_err());
    }

    #[test]
    fn test_parse_args_takes_first_word_as_file() {
        let raw: Vec<String> = ["--tree", "list.txt", "select:0", "indent"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let args = parse_args(&raw).unwrap();
        assert_eq!(args.file, PathBuf::from("list.txt"));
        assert_eq!(args.steps.len(), 2);
        assert!(args.tree);
        assert!(!args.write);
        assert!(parse_args(&[]).is_err());
    }

    #[test]
    fn test_run_writes_result_back() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("list.txt");
        std::fs::write(&file, "* a\n* b\n").unwrap();
        let config = Config {
            id_strategy: IdStrategy::Sequence,
            ..Config::default()
        };
        let args = Args {
            file: file.clone(),
            steps: vec![
                Step::Select(Selection::collapsed(Position::new(1, 0))),
                Step::Apply(Cmd::Indent { blocks: None }),
            ],
            tree: false,
            write: true,
        };

        let doc = run(args, &config).unwrap();

        assert_eq!(doc.blocks()[1].indent(), Some(1));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "* a\n  * b\n");
    }

    #[test]
    fn test_run_mints_ids_with_configured_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("list.txt");
        std::fs::write(&file, "* a\n").unwrap();
        let config = Config {
            id_strategy: IdStrategy::Sequence,
            id_prefix: "n".to_string(),
            ..Config::default()
        };
        let args = Args {
            file,
            steps: vec![
                Step::Select(Selection::collapsed(Position::new(0, 1))),
                Step::Apply(Cmd::Enter),
            ],
            tree: false,
            write: false,
        };

        let doc = run(args, &config).unwrap();

        assert_eq!(io::format(doc.blocks(), None), "* a\n* {id:n00}\n");
    }
}
