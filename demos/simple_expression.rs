use log::debug;
use std::collections::HashMap;
use turtlegraph::parse_expression;

fn main() {
    pretty_env_logger::init();

    let inputs = ["3-0.3*x^2", "(x+3)*(x-7)", "y^2^0.5", "-2^4", "sin(x)", "5(6+x)", "0,5"];

    for input in inputs {
        match parse_expression(input) {
            Ok(tree) => {
                debug!("tree: {tree:?}");
                println!("{input:>12}  =>  {tree}");
                println!("{:>12}      {}", "", tree.to_debug_string());
            }
            Err(err) => println!("{input:>12}  !!  {err}"),
        }
    }

    let tree = parse_expression("x^2+1").unwrap();
    let bindings = HashMap::from([("x".to_string(), 3.0)]);
    println!("x^2+1 at x = 3: {:?}", tree.evaluate(&bindings));
    println!("x^2+1 unbound:  {:?}", tree.evaluate(&HashMap::new()));
}
