mod utils;

fn main() {}
