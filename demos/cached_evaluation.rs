use std::collections::HashMap;
use turtlegraph::Evaluator;

fn main() {
    pretty_env_logger::init();

    let bindings = vec![
        HashMap::from([("x".to_string(), 1.0), ("y".to_string(), 2.0)]),
        HashMap::from([("x".to_string(), -3.0), ("y".to_string(), 0.5)]),
        HashMap::from([("x".to_string(), 0.0)]),
    ];

    let expression = "x^2 + 2*x*y + y^2";

    let mut evaluator = Evaluator::default();
    for (i, context) in bindings.iter().enumerate() {
        match evaluator.evaluate_expression(expression, context) {
            Ok(result) => println!("Result {}: {}", i, result),
            Err(err) => println!("Result {}: {}", i, err),
        }
    }
    println!("Cached trees: {}", evaluator.cache_len());
}
