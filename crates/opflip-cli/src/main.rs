use std::fs;

use anyhow::Result;
use clap::{Arg, Command};
use opflip_core::{init_tracing, invert_source};

/// Demonstration program used when no input file is given.
const SAMPLE_PROGRAM: &str = r#"x = 10
y = 5

while x <= 0 and x < 0:
    x = x + 5
    print("x increased by 5")

if x >= y and x != 0:
    print("x is greater than y and x is not zero")
else:
    print("x is less than y or x is zero")

class MyClass:

    def __init__(self, a, b):
        self.a = a
        self.b = b

    def compare_values(self):
        if self.a > self.b:
            c = self.a < self.b
            print("a is greater than b")
        elif self.a == self.b:
            print("a is equal to b")
        else:
            print("a is less than b")

my_object = MyClass(7, 3)
my_object.compare_values()
"#;

fn main() -> Result<()> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let matches = Command::new("opflip")
        .version(opflip_core::VERSION)
        .about("Inverts the comparison operators inside if/elif conditions and reports every rewrite")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Source file to transform (defaults to a built-in sample program)")
                .index(1),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit the change log as JSON instead of a table")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let source = match matches.get_one::<String>("file") {
        Some(path) => fs::read_to_string(path)?,
        None => SAMPLE_PROGRAM.to_string(),
    };

    let outcome = invert_source(&source)?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&outcome.changes)?);
    } else {
        println!("Operator changes:\n");
        for change in &outcome.changes {
            println!(
                "  {:5} -> {:5}  @  line {}, column {}",
                change.original.to_string(),
                change.replacement.to_string(),
                change.pos.line,
                change.pos.column
            );
        }
    }

    println!("\nModified source:\n\n{}", outcome.source);

    Ok(())
}
