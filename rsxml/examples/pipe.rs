use std::io;
use std::io::{Read, Write};

use tracing_subscriber::EnvFilter;

use rsxml::{ReadOptions, Style};

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(io::stderr)
		.init();

	let style = match std::env::args().nth(1) {
		Some(arg) => arg.parse::<Style>().expect("invalid style argument"),
		None => Style::Compact,
	};

	let mut input = String::new();
	io::stdin()
		.read_to_string(&mut input)
		.expect("failed to read stdin");

	let tree = match rsxml::to_rsxml_tree(&input, &ReadOptions::new().style(style)) {
		Ok(tree) => tree,
		Err(e) => panic!("invalid XML on input: {}", e),
	};
	let output = match rsxml::to_xml(&tree) {
		Ok(output) => output,
		Err(e) => panic!("failed to write tree: {}", e),
	};

	let mut stdout = io::stdout();
	stdout
		.write_all(output.as_bytes())
		.expect("failed to write to stdout");
	stdout.write_all(b"\n").expect("failed to write to stdout");
}
