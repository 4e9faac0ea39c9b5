use cordyceps_avl::{
    equal_paths::{equal_paths, BinaryNode},
    AvlMap,
};
use log::{info, warn};

const DEFAULT_KEYS: [u32; 9] = [10, 20, 30, 25, 5, 1, 40, 35, 15];

fn print_graph(map: &AvlMap<u32, u32>, name: &str) {
    let mut graph = String::new();

    match map.dotgraph(name, &mut graph) {
        Ok(()) => println!("{graph}"),
        Err(err) => warn!("failed to render {name}: {err}"),
    }
}

// Usage: main [KEY]...
//
// Inserts the keys into a map, prints the tree as a Graphviz digraph, then removes every other
// key and prints it again. Set `RUST_LOG=trace` to follow the rotations.
fn main() {
    env_logger::init();

    let mut keys: Vec<u32> = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.parse() {
            Ok(key) => keys.push(key),
            Err(err) => warn!("ignoring {arg:?}: {err}"),
        }
    }

    if keys.is_empty() {
        keys.extend(DEFAULT_KEYS);
    }

    let mut map = AvlMap::new();

    for &key in &keys {
        if let Some(old) = map.insert(key, key.wrapping_mul(10)) {
            info!("overwrote {key} (was {old})");
        }

        map.assert_invariants();
        info!("inserted {key}: len {}, height {}", map.len(), map.height());
    }

    print_graph(&map, "inserted");

    for key in keys.iter().step_by(2) {
        if map.remove(key).is_some() {
            map.assert_invariants();
            info!("removed {key}: len {}, height {}", map.len(), map.height());
        }
    }

    print_graph(&map, "removed");

    match map.at(&keys[0]) {
        Ok(value) => println!("{} => {value}", keys[0]),
        Err(err) => println!("{}: {err}", keys[0]),
    }

    let tree = BinaryNode::new(
        1,
        Some(BinaryNode::leaf(2)),
        Some(BinaryNode::new(3, Some(BinaryNode::leaf(4)), None)),
    );
    println!("equal paths: {}", equal_paths(Some(&tree)));
}
