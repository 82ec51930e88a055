//! Building a context document programmatically and rendering both formats.
//!
//! Run with: cargo run --example simple

use context_pack::{
    Builder, Directive, Format, Rendered, Reporter, Value, ValueSource,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let directives = vec![
        Directive::Meta(vec![(
            "version".to_string(),
            ValueSource::Literal(Value::from("1.0")),
        )]),
        Directive::Variable(vec![(
            "purpose".to_string(),
            ValueSource::Literal(Value::from("demo")),
        )]),
        Directive::Namespace(
            "build".to_string(),
            vec![
                Directive::File {
                    path: "Cargo.toml".to_string(),
                    tags: vec!["manifest".to_string()],
                },
                Directive::Command {
                    command: "rustc --version".to_string(),
                    tags: vec!["toolchain".to_string()],
                },
            ],
        ),
    ];

    let mut reporter = Reporter::stderr(true);
    let document = Builder::new(&mut reporter).build(&directives)?;

    let mut rendered = Rendered::new(&document);
    println!("TOON ({} bytes):", rendered.size(Format::Toon)?);
    println!("{}", rendered.text(Format::Toon)?);
    println!("JSON ({} bytes):", rendered.size(Format::Json)?);
    println!("{}", rendered.text(Format::Json)?);

    reporter.built(rendered.size(Format::Toon)?, Format::Toon);
    Ok(())
}
