#[macro_use]
extern crate afl;
extern crate rsxml;

use rsxml::ReadOptions;

fn main() {
	fuzz!(|data: &[u8]| {
		let text = match std::str::from_utf8(data) {
			Ok(text) => text,
			Err(_) => return,
		};
		let tree = match rsxml::to_rsxml_tree(text, &ReadOptions::new()) {
			Ok(tree) => tree,
			Err(_) => return,
		};
		// anything which was read must be writable, and read back the same
		let xml = rsxml::to_xml(&tree).unwrap();
		let reread = rsxml::to_rsxml_tree(&xml, &ReadOptions::new()).unwrap();
		assert_eq!(tree, reread);
	});
}
