use std::cell::Cell;
use std::rc::Rc;

use ferrous_autowire::{
    reference, Args, Callable, ConstructorDescriptor, Container, ContainerOptions, Definition, DiError, Param,
    Receiver, Resolver, Target, TypeDescriptor, TypeRegistry, Value, Visibility,
};

fn greeter() -> TypeDescriptor {
    TypeDescriptor::class("Greeter")
        .constructor(vec![Param::new("text").typed("string")], |this, args| {
            this.set("text", args[0].clone());
            Ok(())
        })
        .method("getText", vec![], |this, _| Ok(this.get("text")))
}

fn filesystem_types() -> TypeRegistry {
    TypeRegistry::new()
        .with_type(TypeDescriptor::interface("Filesystem"))
        .with_type(TypeDescriptor::class("LocalDisk").implements("Filesystem"))
        .with_type(TypeDescriptor::class("S3Disk").implements("Filesystem"))
        .with_type(
            TypeDescriptor::class("PhotoController")
                .constructor(vec![Param::new("disk").typed("Filesystem")], |this, args| {
                    this.set("disk", args[0].clone());
                    Ok(())
                }),
        )
}

fn disk_of(controller: &Value) -> String {
    let disk = controller.as_object().unwrap().get("disk");
    disk.as_object().unwrap().type_name().to_string()
}

#[test]
fn test_greeter_return_step_yields_constructor_argument() {
    let types = TypeRegistry::new().with_type(greeter());
    let container = Container::new(types);

    let mut definition = container.factory("Greeter").unwrap();
    definition.set_param("text", "foo");
    definition.returns("@getText", Value::Null).unwrap();

    let value = definition.resolve(&container, Args::new()).unwrap();
    assert_eq!(value, Value::from("foo"));
}

#[test]
fn test_closure_joins_first_and_last_name() {
    let container = Container::new(TypeRegistry::new());
    let full_name = Callable::closure(vec![Param::new("first"), Param::new("last")], |args| {
        let first = args[0].as_str().unwrap_or_default();
        let last = args[1].as_str().unwrap_or_default();
        Ok(Value::from(format!("{} {}", first, last)))
    });

    let out = container
        .call(full_name, Args::new().with("first", "John").with("last", "Doe"))
        .unwrap();
    assert_eq!(out, Value::from("John Doe"));
}

#[test]
fn test_missing_required_parameter_names_the_parameter() {
    let container = Container::new(TypeRegistry::new());
    let echo = Callable::closure(vec![Param::new("name").typed("string")], |args| Ok(args[0].clone()));

    let err = container.call(echo, Args::new()).unwrap_err();
    assert!(err.is_resolver());
    assert!(err.chain().any(DiError::is_failed_parameter));
    assert_eq!(
        err.root_cause().to_string(),
        "Parameter $name (type: string) is not allowing null and no default value provided."
    );
}

#[test]
fn test_type_mismatch_reports_expected_and_actual() {
    let container = Container::new(TypeRegistry::new());
    let echo = Callable::closure(vec![Param::new("name").typed("string")], |args| Ok(args[0].clone()));

    let err = container.call(echo, Args::new().with("name", 0)).unwrap_err();
    assert!(err.is_resolver());
    assert_eq!(err.root_cause().to_string(), "Parameter $name expects string. Provided int.");
}

#[test]
fn test_parameter_failure_is_wrapped_with_position_and_function() {
    let types = TypeRegistry::new().with_function(Callable::new(
        "send",
        vec![Param::new("to").typed("string"), Param::new("body").typed("string")],
        |_| Ok(Value::Null),
    ));
    let container = Container::new(types);

    let err = container.call("send", Args::new().with("to", "ops@local")).unwrap_err();
    let messages: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    assert_eq!(messages[0], "Failed resolving function send parameters.");
    assert_eq!(messages[1], "Failed resolve the #2 send() parameter.");
    assert!(messages[2].starts_with("Parameter $body (type: string)"));
}

#[test]
fn test_constructible_types_are_fresh_on_every_call() {
    let types = TypeRegistry::new().with_type(TypeDescriptor::class("Mailer"));
    let container = Container::new(types);

    let a = container.call("Mailer", Args::new()).unwrap();
    let b = container.call("Mailer", Args::new()).unwrap();
    assert_ne!(a, b);
    assert_eq!(a.as_object().unwrap().type_name(), "Mailer");
}

#[test]
fn test_explicit_argument_beats_contextual_binding() {
    let types = TypeRegistry::new().with_type(greeter());
    let container = Container::new(types);
    container.when("Greeter").needs("$text").give(Value::from("contextual"));

    let explicit = container.call("Greeter", Args::new().with("text", "explicit")).unwrap();
    assert_eq!(explicit.as_object().unwrap().get("text"), Value::from("explicit"));

    let contextual = container.call("Greeter", Args::new()).unwrap();
    assert_eq!(contextual.as_object().unwrap().get("text"), Value::from("contextual"));
}

#[test]
fn test_contextual_binding_by_type_selects_implementation() {
    let container = Container::new(filesystem_types());
    container.when("PhotoController").needs("Filesystem").give("S3Disk");

    let controller = container.call("PhotoController", Args::new()).unwrap();
    assert_eq!(disk_of(&controller), "S3Disk");
}

#[test]
fn test_argument_keyed_by_type_name() {
    let container = Container::new(filesystem_types());
    let local = container.call("LocalDisk", Args::new()).unwrap();

    let controller = container
        .call("PhotoController", Args::new().with("Filesystem", local.clone()))
        .unwrap();
    assert_eq!(controller.as_object().unwrap().get("disk"), local);
}

#[test]
fn test_argument_by_position() {
    let types = TypeRegistry::new().with_type(greeter());
    let container = Container::new(types);

    let greeter = container.call("Greeter", Args::new().with("0", "positional")).unwrap();
    assert_eq!(greeter.as_object().unwrap().get("text"), Value::from("positional"));
}

#[test]
fn test_null_argument_counts_as_absent() {
    let types = TypeRegistry::new().with_type(
        TypeDescriptor::class("Retry")
            .constructor(vec![Param::new("times").typed("int").with_default(3)], |this, args| {
                this.set("times", args[0].clone());
                Ok(())
            }),
    );
    let container = Container::new(types);

    let retry = container.call("Retry", Args::new().with("times", Value::Null)).unwrap();
    assert_eq!(retry.as_object().unwrap().get("times"), Value::Int(3));
}

#[test]
fn test_interface_implementer_passes_type_check() {
    let container = Container::new(filesystem_types());
    let s3 = container.call("S3Disk", Args::new()).unwrap();

    let controller = container.call("PhotoController", Args::new().with("disk", s3)).unwrap();
    assert_eq!(disk_of(&controller), "S3Disk");
}

#[test]
fn test_unrelated_object_fails_type_check() {
    let types = filesystem_types().with_type(TypeDescriptor::class("Mailer"));
    let container = Container::new(types);
    let mailer = container.call("Mailer", Args::new()).unwrap();

    let err = container
        .call("PhotoController", Args::new().with("disk", mailer))
        .unwrap_err();
    assert!(err.is_resolver());
    assert_eq!(
        err.root_cause().to_string(),
        "Parameter $disk expects an instance of Filesystem. Provided Mailer."
    );
}

#[test]
fn test_reference_resolves_through_container() {
    let container = Container::new(filesystem_types());
    container.define_shared("disk.s3", "S3Disk").unwrap();

    let controller = container
        .call("PhotoController", Args::new().with("disk", reference("disk.s3")))
        .unwrap();
    assert_eq!(controller.as_object().unwrap().get("disk"), container.get("disk.s3").unwrap());
}

#[test]
fn test_reference_to_missing_key_is_null_for_nullable_parameter() {
    let types = TypeRegistry::new().with_type(TypeDescriptor::interface("Logger")).with_type(
        TypeDescriptor::class("Worker")
            .constructor(vec![Param::new("logger").typed("Logger").nullable()], |this, args| {
                this.set("logger", args[0].clone());
                Ok(())
            }),
    );
    let container = Container::new(types);

    let worker = container
        .call("Worker", Args::new().with("logger", reference("missing")))
        .unwrap();
    assert!(worker.as_object().unwrap().get("logger").is_null());
}

#[test]
fn test_reference_to_missing_key_fails_for_required_parameter() {
    let types = TypeRegistry::new().with_type(TypeDescriptor::interface("Logger")).with_type(
        TypeDescriptor::class("Worker")
            .constructor(vec![Param::new("logger").typed("Logger")], |_, _| Ok(())),
    );
    let container = Container::new(types);

    let err = container
        .call("Worker", Args::new().with("logger", reference("missing")))
        .unwrap_err();
    assert!(err.is_resolver());
    assert!(err.full_message().contains("$logger"));
    assert!(!err.chain().any(DiError::is_not_found));
}

#[test]
fn test_nullable_parameters_without_value_resolve_to_null() {
    let container = Container::new(TypeRegistry::new());
    let f = Callable::closure(
        vec![Param::new("typed").typed("int").nullable(), Param::new("untyped")],
        |args| Ok(Value::List(args.to_vec())),
    );

    let out = container.call(f, Args::new()).unwrap();
    assert_eq!(out, Value::List(vec![Value::Null, Value::Null]));
}

#[test]
fn test_auto_resolution_failure_is_chained_as_cause() {
    let types = TypeRegistry::new().with_type(
        TypeDescriptor::class("Report")
            .constructor(vec![Param::new("printer").typed("Printer")], |_, _| Ok(())),
    );
    let container = Container::new(types);

    let err = container.call("Report", Args::new()).unwrap_err();
    assert!(err.is_resolver());
    assert_eq!(err.to_string(), "Failed resolve the #1 Report::constructor() parameter.");
    assert!(err.chain().any(DiError::is_not_found));
    assert!(err
        .full_message()
        .contains("could not be resolved automatically, it is not allowing null"));
}

#[test]
fn test_auto_resolution_falls_back_to_default() {
    let types = TypeRegistry::new().with_type(
        TypeDescriptor::class("Report")
            .constructor(vec![Param::new("printer").typed("Printer").with_default("none")], |this, args| {
                this.set("printer", args[0].clone());
                Ok(())
            }),
    );
    let container = Container::new(types);

    let report = container.call("Report", Args::new()).unwrap();
    assert_eq!(report.as_object().unwrap().get("printer"), Value::from("none"));
}

#[test]
fn test_injectors_run_once_after_construction() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);

    let types = TypeRegistry::new()
        .with_type(TypeDescriptor::class("Clock"))
        .with_type(
            TypeDescriptor::class("Service")
                .method("injectClock", vec![Param::new("clock").typed("Clock")], move |this, args| {
                    counter.set(counter.get() + 1);
                    this.set("clock", args[0].clone());
                    Ok(Value::Null)
                })
                .method("inject", vec![], |this, _| {
                    this.set("plain", true);
                    Ok(Value::Null)
                })
                .method("injectHidden", vec![], |this, _| {
                    this.set("hidden", true);
                    Ok(Value::Null)
                }),
        );
    let options = ContainerOptions { autowire: true, ..Default::default() };
    let container = Container::with_options(types, options);

    let service = container.call("Service", Args::new()).unwrap();
    let service = service.as_object().unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(service.get("clock").as_object().unwrap().type_name(), "Clock");
    assert_eq!(service.get("plain"), Value::Bool(true));
    assert_eq!(service.get("hidden"), Value::Bool(true));
}

#[test]
fn test_private_injectors_are_skipped() {
    let types = TypeRegistry::new().with_type(TypeDescriptor::class("Service").with_method(
        ferrous_autowire::MethodDescriptor::instance("injectSecret", vec![], |this, _| {
            this.set("secret", true);
            Ok(Value::Null)
        })
        .visibility(Visibility::Private),
    ));
    let container = Container::new(types);

    let service = container.call("Service", Args::new()).unwrap();
    assert!(!service.as_object().unwrap().has("secret"));
}

#[test]
fn test_factory_type_returns_created_value() {
    let types = TypeRegistry::new()
        .with_type(TypeDescriptor::interface("Factory"))
        .with_type(
            TypeDescriptor::class("ConnectionFactory")
                .implements("Factory")
                .method("injectDsn", vec![Param::new("dsn").typed("string")], |this, args| {
                    this.set("dsn", args[0].clone());
                    Ok(Value::Null)
                })
                .method("create", vec![], |this, _| {
                    Ok(Value::from(format!("connection to {}", this.get("dsn").as_str().unwrap_or_default())))
                }),
        );
    let container = Container::new(types);

    let out = container
        .call("ConnectionFactory", Args::new().with("dsn", "sqlite::memory:"))
        .unwrap();
    assert_eq!(out, Value::from("connection to sqlite::memory:"));
}

#[test]
fn test_positional_arguments_only_reach_the_constructor() {
    let types = TypeRegistry::new()
        .with_type(TypeDescriptor::interface("Factory"))
        .with_type(
            TypeDescriptor::class("TagFactory")
                .implements("Factory")
                .constructor(vec![Param::new("prefix").typed("string")], |this, args| {
                    this.set("prefix", args[0].clone());
                    Ok(())
                })
                .method("injectSuffix", vec![Param::new("suffix").with_default("!")], |this, args| {
                    this.set("suffix", args[0].clone());
                    Ok(Value::Null)
                })
                .method("create", vec![Param::new("name").with_default("tag")], |this, args| {
                    Ok(Value::from(format!(
                        "{}{}{}",
                        this.get("prefix").as_str().unwrap_or_default(),
                        args[0].as_str().unwrap_or_default(),
                        this.get("suffix").as_str().unwrap_or_default()
                    )))
                }),
        );
    let container = Container::new(types);

    let out = container.call("TagFactory", Args::new().with("0", "#")).unwrap();
    assert_eq!(out, Value::from("#tag!"));

    let named = container
        .call("TagFactory", Args::new().with("0", "#").with("suffix", "?").with("name", "rust"))
        .unwrap();
    assert_eq!(named, Value::from("#rust?"));
}

#[test]
fn test_factory_without_create_method_fails() {
    let types = TypeRegistry::new()
        .with_type(TypeDescriptor::interface("Factory"))
        .with_type(TypeDescriptor::class("BrokenFactory").implements("Factory"));
    let container = Container::new(types);

    let err = container.call("BrokenFactory", Args::new()).unwrap_err();
    assert_eq!(err.to_string(), "Factory object 'BrokenFactory' does not implement create() method.");
}

#[test]
fn test_static_method_needs_no_instance() {
    let types = TypeRegistry::new().with_type(
        TypeDescriptor::abstract_class("Math").static_method(
            "double",
            vec![Param::new("n").typed("int")],
            |args| Ok(Value::Int(args[0].as_int().unwrap_or_default() * 2)),
        ),
    );
    let container = Container::new(types);

    let out = container.call("Math::double", Args::new().with("n", 21)).unwrap();
    assert_eq!(out, Value::Int(42));
}

#[test]
fn test_method_on_type_name_builds_receiver_without_call_arguments() {
    let types = TypeRegistry::new().with_type(greeter());
    let container = Container::new(types);
    let target = Target::Method(Receiver::Type("Greeter".into()), "getText".into());

    let out = container.call(target, Args::new().with("text", "ignored"));
    // The receiver is built without the caller's arguments
    let err = out.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Method Greeter::getText() could not be invoked because its declaring class could not be instantiated."
    );
}

#[test]
fn test_method_on_instance() {
    let types = TypeRegistry::new().with_type(greeter());
    let container = Container::new(types);
    let greeter = container.call("Greeter", Args::new().with("text", "hi")).unwrap();
    let object = greeter.as_object().unwrap().clone();

    let out = container.call((object, "getText"), Args::new()).unwrap();
    assert_eq!(out, Value::from("hi"));
}

#[test]
fn test_non_public_method_cannot_be_invoked() {
    let types = TypeRegistry::new().with_type(TypeDescriptor::class("Vault").with_method(
        ferrous_autowire::MethodDescriptor::instance("open", vec![], |_, _| Ok(Value::Bool(true)))
            .visibility(Visibility::Protected),
    ));
    let container = Container::new(types);

    let err = container.call("Vault::open", Args::new()).unwrap_err();
    assert!(err.is_resolver());
    assert_eq!(err.to_string(), "Method Vault::open() could not be invoked.");
}

#[test]
fn test_missing_method_fails() {
    let types = TypeRegistry::new().with_type(TypeDescriptor::class("Vault"));
    let container = Container::new(types);

    let err = container.call("Vault::open", Args::new()).unwrap_err();
    assert_eq!(err.to_string(), "Method Vault::open() does not exist");
}

#[test]
fn test_abstract_types_are_not_instantiable() {
    let types = TypeRegistry::new()
        .with_type(TypeDescriptor::abstract_class("Shape"))
        .with_type(TypeDescriptor::interface("Drawable"));
    let container = Container::new(types);

    for name in ["Shape", "Drawable"] {
        let err = container.call(name, Args::new()).unwrap_err();
        assert_eq!(err.to_string(), format!("Class \"{}\" is not instantiable.", name));
    }
}

#[test]
fn test_unknown_type_fails() {
    let container = Container::new(TypeRegistry::new());
    let err = container.call("Nope", Args::new()).unwrap_err();
    assert!(err.is_resolver());
    assert_eq!(err.to_string(), "Class \"Nope\" does not exist");
}

#[test]
fn test_non_public_constructor_fails() {
    let types = TypeRegistry::new().with_type(
        TypeDescriptor::class("Singleton")
            .with_constructor(ConstructorDescriptor::new(vec![], |_, _| Ok(())).visibility(Visibility::Private)),
    );
    let container = Container::new(types);

    let err = container.call("Singleton", Args::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Singleton can not be instantiated because its constructor is not public."
    );
}

#[test]
fn test_constructor_body_errors_are_wrapped() {
    let types = TypeRegistry::new().with_type(
        TypeDescriptor::class("Flaky").constructor(vec![], |_, _| Err(DiError::Invocation("boom".into()))),
    );
    let container = Container::new(types);

    let err = container.call("Flaky", Args::new()).unwrap_err();
    assert_eq!(err.to_string(), "Class Flaky could not be instantiated.");
    assert!(matches!(err.root_cause(), DiError::Invocation(msg) if msg == "boom"));
}

#[test]
fn test_function_body_errors_are_wrapped() {
    let types = TypeRegistry::new().with_function(Callable::new("explode", vec![], |_| {
        Err(DiError::Invocation("kaboom".into()))
    }));
    let container = Container::new(types);

    let err = container.call("explode", Args::new()).unwrap_err();
    assert_eq!(err.to_string(), "Function explode() could not be invoked.");
}

#[test]
fn test_callable_parameter_accepts_function_names() {
    let types = TypeRegistry::new().with_function(Callable::new("strlen", vec![Param::new("s")], |args| {
        Ok(Value::Int(args[0].as_str().map_or(0, |s| s.len() as i64)))
    }));
    let container = Container::new(types);
    let apply = Callable::closure(vec![Param::new("fn").typed("callable")], |args| Ok(args[0].clone()));

    assert_eq!(
        container.call(apply.clone(), Args::new().with("fn", "strlen")).unwrap(),
        Value::from("strlen")
    );
    let err = container.call(apply, Args::new().with("fn", "not_a_function")).unwrap_err();
    assert_eq!(err.root_cause().to_string(), "Parameter $fn expects callable. Provided string.");
}

#[test]
fn test_resolve_value_targets() {
    let types = TypeRegistry::new().with_type(greeter());
    let container = Container::new(types);
    let resolver = Resolver::new(&container);

    let built = resolver
        .resolve_value(&Value::from("Greeter"), &Args::new().with("text", "a"))
        .unwrap();
    let pair = Value::List(vec![built.clone(), Value::from("getText")]);
    assert_eq!(resolver.resolve_value(&pair, &Args::new()).unwrap(), Value::from("a"));

    let err = resolver.resolve_value(&Value::Int(5), &Args::new()).unwrap_err();
    assert!(err.is_resolver());
}

#[test]
fn test_definition_params_merge_under_call_arguments() {
    let types = TypeRegistry::new().with_type(
        TypeDescriptor::class("Database")
            .constructor(vec![Param::new("options").typed("array")], |this, args| {
                this.set("options", args[0].clone());
                Ok(())
            }),
    );
    let container = Container::new(types);
    let definition = Definition::with_args(
        container.types(),
        "Database",
        [("options", Args::new().with("host", "localhost").with("port", 5432))],
    )
    .unwrap();

    let built = definition
        .resolve(&container, Args::new().with("options", Args::new().with("port", 6432)))
        .unwrap();
    let options = built.as_object().unwrap().get("options");
    let options = options.as_map().unwrap();
    assert_eq!(options.get("host"), Some(&Value::from("localhost")));
    assert_eq!(options.get("port"), Some(&Value::Int(6432)));
}
