use argot::{Grammar, MatchResult, Matches, Problem, StopKind, UsageParser};
use rand::seq::SliceRandom;
use rstest::rstest;

#[macro_use]
extern crate assert_matches;

fn parse(usage: &str, tokens: &[&str]) -> MatchResult {
    UsageParser::new(usage).build().unwrap().parse_tokens(tokens)
}

fn success(usage: &str, tokens: &[&str]) -> Matches {
    match parse(usage, tokens) {
        MatchResult::Success(matches) => matches,
        other => panic!("expected a success, not {other:?}"),
    }
}

fn problems(usage: &str, tokens: &[&str]) -> Vec<Problem> {
    match parse(usage, tokens) {
        MatchResult::Failure(diagnostics) => diagnostics
            .iter()
            .map(|diagnostic| diagnostic.problem().clone())
            .collect(),
        other => panic!("expected a failure, not {other:?}"),
    }
}

#[rstest]
#[case("prog find <pattern> <file>...")]
#[case("Usage:\n  prog [-v/--verbose] add <item>\n  prog remove [-f] <item>...\nOptions:\n  -f, --force  Force it.")]
#[case("prog [options] <x>\noptions:\n  -a  all\n  --depth <n>  depth")]
fn idempotent_compile(#[case] usage: &str) {
    // Execute
    let first = Grammar::compile(usage).unwrap();
    let second = Grammar::compile(usage).unwrap();

    // Verify
    assert_eq!(first, second);
    assert_eq!(first.usage(), second.usage());
}

#[test]
fn round_trip() {
    // Execute
    let matches = success(
        "prog find <pattern> <file>...",
        &["find", "foo", "a.txt", "b.txt"],
    );

    // Verify
    assert!(matches.has("find"));
    assert_eq!(matches.value("<pattern>"), Some("foo"));
    assert_eq!(matches.values("<file>"), &["a.txt", "b.txt"]);
    assert!(matches.leftover().is_empty());
}

#[rstest]
#[case(vec!["-x"])]
#[case(vec!["-y"])]
fn mutual_exclusion_single(#[case] tokens: Vec<&str>) {
    // Execute
    let matches = success("prog (-x|-y)", &tokens);

    // Verify
    assert!(matches.has(tokens[0]));
}

#[test]
fn mutual_exclusion_both() {
    // Execute
    let problems = problems("prog (-x|-y)", &["-x", "-y"]);

    // Verify
    assert_eq!(
        problems[0],
        Problem::MutuallyExclusive("-x".to_string(), "-y".to_string())
    );
}

#[test]
fn letter_group() {
    // Execute
    let matches = success("prog [-a] [-c] [-e]", &["-ace"]);

    // Verify
    assert!(matches.has("-a"));
    assert!(matches.has("-c"));
    assert!(matches.has("-e"));
}

#[test]
fn letter_group_collision() {
    // Execute
    let problems = problems("prog [-a] [-c] [-e] [--ace]", &["-ace"]);

    // Verify
    assert_eq!(problems, vec![Problem::Ambiguous("-ace".to_string())]);
}

#[rstest]
#[case(vec!["X"], None)]
#[case(vec!["X", "Y"], Some("Y"))]
fn optional_operand_elision(#[case] tokens: Vec<&str>, #[case] two: Option<&str>) {
    // Execute
    let matches = success("prog <one> [<two>]", &tokens);

    // Verify
    assert_eq!(matches.value("one"), Some("X"));
    assert_eq!(matches.has("two"), two.is_some());
    assert_eq!(matches.value("two"), two);
}

#[test]
fn repeat_distribution() {
    // Execute
    let matches = success("prog <a> <b>...", &["1", "2", "3", "4"]);

    // Verify
    assert_eq!(matches.values("a"), &["1"]);
    assert_eq!(matches.values("b"), &["2", "3", "4"]);
}

#[rstest]
#[case(vec!["b", "b"], "b", 2)]
#[case(vec!["a"], "a", 1)]
fn repeated_alternation(#[case] tokens: Vec<&str>, #[case] name: &str, #[case] count: usize) {
    // Execute
    let matches = success("prog [a | b]...", &tokens);

    // Verify
    assert_eq!(matches.invocation(), "prog [a | b]...");
    assert_eq!(matches.count(name), count);
}

#[test]
fn alternative_fallback() {
    // Execute
    let matches = success("prog add <item> | prog remove <item>", &["remove", "X"]);

    // Verify
    assert_eq!(matches.invocation(), "prog remove <item>");
    assert!(!matches.has("add"));
    assert!(matches.has("remove"));
    assert_eq!(matches.value("item"), Some("X"));
}

#[rstest]
#[case(vec!["--help"])]
#[case(vec!["-h"])]
#[case(vec!["a", "b", "--help"])]
fn reserved_stop(#[case] tokens: Vec<&str>) {
    // Execute
    let result = parse("prog <x>", &tokens);

    // Verify
    assert_eq!(result, MatchResult::Stop(StopKind::Help));
}

#[test]
fn reserved_stop_declared() {
    // Setup
    let parser = UsageParser::new("prog [-h/--help] <x>").build().unwrap();

    // Execute
    let result = parser.parse_tokens(vec!["--help"].as_slice());

    // Verify
    assert_eq!(result, MatchResult::Stop(StopKind::Help));
    assert_eq!(parser.grammar().invocation_count(), 1);
}

#[test]
fn option_order() {
    // Setup
    let usage = "prog [-a] [-b] [-c] [--depth <n>] <file>";
    let mut options = vec![vec!["-a"], vec!["-b"], vec!["-c"], vec!["--depth", "3"]];
    let mut rng = rand::thread_rng();

    for _ in 0..10 {
        options.shuffle(&mut rng);
        let mut tokens: Vec<&str> = options.iter().flatten().copied().collect();
        tokens.push("f.txt");

        // Execute
        let matches = success(usage, &tokens);

        // Verify
        assert!(matches.has("-a"));
        assert!(matches.has("-b"));
        assert!(matches.has("-c"));
        assert_eq!(matches.value("--depth"), Some("3"));
        assert_eq!(matches.value("<file>"), Some("f.txt"));
        assert_eq!(matches.options().len(), 4);
    }
}

#[test]
fn options_section() {
    // Setup
    let usage = "Usage: prog [options] <file>

Options:
  -f, --force    Remove even when in use.
  --depth <n>    How far to descend.";

    // Execute
    let matches = success(usage, &["--depth=2", "-f", "a"]);

    // Verify
    assert_eq!(matches.invocation(), "prog [options] <file>");
    assert!(matches.has("force"));
    assert_eq!(matches.value("depth"), Some("2"));
}

#[test]
fn failure_diagnostics() {
    // Setup
    let parser = UsageParser::new("prog add <item>\nprog list").build().unwrap();

    // Execute
    let result = parser.parse_tokens(vec!["list", "X"].as_slice());

    // Verify
    assert_matches!(result, MatchResult::Failure(diagnostics) => {
        let lines: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "prog add <item>: No matching operand pattern.".to_string(),
                "prog list: No matching operand pattern.".to_string(),
            ]
        );
    });
}
