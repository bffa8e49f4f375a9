use countdown_tree::{Config, CountdownTree};
use log::LevelFilter;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Trace)
        .init();

    let mut tree: CountdownTree<u32> = CountdownTree::with_config(Config::DEFAULT);

    // An ascending run builds a chain until the countdown runs out.
    for key in 0..12 {
        tree.insert(key);
        tree.assert_invariants();
        println!("countdown {:>2} | {tree}", tree.countdown());
    }

    for key in [3, 7, 42] {
        let removed = tree.remove(&key);
        tree.assert_invariants();
        println!("remove {key:>2} -> {removed:?} | {tree}");
    }

    tree.rebalance();
    tree.assert_balanced();
    println!("height {}, keys {:?}", tree.height(), tree);

    for violation in tree.validate() {
        println!("{violation}");
    }

    let mut dot = String::new();
    tree.dotgraph("demo", &mut dot).unwrap();
    println!("{dot}");

    drop(tree);
}
