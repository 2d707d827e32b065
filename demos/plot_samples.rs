use turtlegraph::PlotOptions;

fn main() {
    pretty_env_logger::init();

    let mut options = PlotOptions::default();
    options.function.set("3-0.3*x^2".to_string());
    options.x_min.set(-6.0);
    options.x_max.set(6.0);

    let request = match options.request() {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let labels = options.labels();
    println!("{}{}", labels[0], request.function());

    for point in request.sample(13).unwrap() {
        match point.y {
            Some(y) => println!("{:>6.2}  {:>8.3}", point.x, y),
            None => println!("{:>6.2}  {:>8}", point.x, "-"),
        }
    }
}
