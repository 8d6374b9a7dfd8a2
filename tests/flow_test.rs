use realistic_render::flow::apply_mutations;

type Mutation = Box<dyn FnOnce(&mut Vec<&'static str>)>;

fn push(name: &'static str) -> Box<dyn Future<Output = Mutation>> {
    Box::new(async move {
        tokio::task::yield_now().await;
        Box::new(move |log: &mut Vec<&'static str>| log.push(name)) as Mutation
    })
}

#[test]
fn should_apply_every_mutation_in_order() {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let mut log = Vec::new();

    let applied = apply_mutations(
        &runtime,
        vec![push("environment"), push("wood"), push("hamburger")],
        &mut log,
    );

    assert_eq!(applied, 3);
    assert_eq!(log, ["environment", "wood", "hamburger"]);
}

#[test]
fn should_do_nothing_without_futures() {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let mut log: Vec<&'static str> = Vec::new();
    assert_eq!(apply_mutations(&runtime, Vec::new(), &mut log), 0);
    assert!(log.is_empty());
}
