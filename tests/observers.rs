use std::rc::Rc;

use ferrous_autowire::{
    Args, Container, ContainerOptions, DiError, LoggingObserver, MetricsObserver, Param, TypeDescriptor, TypeRegistry,
};

fn types() -> TypeRegistry {
    TypeRegistry::new()
        .with_type(TypeDescriptor::class("Clock"))
        .with_type(
            TypeDescriptor::class("Scheduler")
                .constructor(vec![Param::new("clock").typed("Clock")], |this, args| {
                    this.set("clock", args[0].clone());
                    Ok(())
                }),
        )
        .with_type(TypeDescriptor::class("Broken").constructor(vec![], |_, _| {
            Err(DiError::Invocation("cannot start".into()))
        }))
}

#[test]
fn test_metrics_count_nested_resolutions() {
    let container = Container::with_options(types(), ContainerOptions { autowire: true, ..Default::default() });
    let metrics = Rc::new(MetricsObserver::new());
    container.add_observer(metrics.clone());

    container.get("Scheduler").unwrap();
    assert_eq!(metrics.resolution_count(), 2);
    assert_eq!(metrics.failure_count(), 0);
    assert!(metrics.average_resolution_time().is_some());

    metrics.reset();
    assert_eq!(metrics.resolution_count(), 0);
    assert!(metrics.average_resolution_time().is_none());
}

#[test]
fn test_metrics_count_failures() {
    let container = Container::new(types());
    container.define("broken", "Broken").unwrap();
    let metrics = Rc::new(MetricsObserver::new());
    container.add_observer(metrics.clone());

    assert!(container.get("broken").is_err());
    assert_eq!(metrics.failure_count(), 1);
    assert_eq!(metrics.resolution_count(), 0);
}

#[test]
fn test_direct_calls_are_not_observed() {
    let container = Container::new(types());
    let metrics = Rc::new(MetricsObserver::new());
    container.add_observer(metrics.clone());

    container.call("Clock", Args::new()).unwrap();
    assert_eq!(metrics.resolution_count(), 0);
}

#[test]
fn test_logging_observer_emits_events() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let container = Container::new(types());
        container.add_observer(Rc::new(LoggingObserver::with_prefix("[test]")));
        container.define("broken", "Broken").unwrap();
        container.define("Clock", ()).unwrap();

        container.get("Clock").unwrap();
        assert!(container.get("broken").is_err());
    });
}
