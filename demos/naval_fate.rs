use argot::{MatchResult, StopKind, UsageParser};

const USAGE: &str = "Usage:
  naval_fate ship new <name>...
  naval_fate ship <name> move <x> <y> [--speed <kn>]
  naval_fate ship shoot <x> <y>
  naval_fate mine (set|remove) <x> <y> [--moored|--drifting]

Options:
  --speed <kn>  Speed in knots.
  --moored      Moored (anchored) mine.
  --drifting    Drifting mine.
";

fn main() {
    let parser = match UsageParser::new(USAGE).version().build() {
        Ok(parser) => parser,
        Err(error) => {
            eprintln!("Usage error: {error}");
            std::process::exit(2);
        }
    };

    match parser.parse() {
        MatchResult::Success(matches) => {
            println!("Matched: {}", matches.invocation());

            for bound in matches.options().iter().chain(matches.operands()) {
                println!("  {} = {:?}", bound.name(), bound.values());
            }
        }
        MatchResult::Stop(StopKind::Version) => println!("naval_fate 2.0"),
        MatchResult::Stop(_) => println!("{}", parser.usage()),
        MatchResult::Failure(diagnostics) => {
            for diagnostic in diagnostics {
                eprintln!("{diagnostic}");
            }

            eprintln!("{}", parser.usage());
            std::process::exit(1);
        }
    }
}
