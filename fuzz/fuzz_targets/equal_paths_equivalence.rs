#![no_main]

use cordyceps_avl::model::{run_equal_paths_equivalence, Shape};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|shape: Option<Shape>| {
    run_equal_paths_equivalence(shape);
});
