use std::cell::Cell;
use std::rc::Rc;

use ferrous_autowire::{
    reference, Args, Callable, Container, Implementation, Param, Target, TypeDescriptor, TypeRegistry, Value,
};

fn storage_types() -> TypeRegistry {
    TypeRegistry::new()
        .with_type(TypeDescriptor::interface("Filesystem"))
        .with_type(TypeDescriptor::class("LocalDisk").implements("Filesystem"))
        .with_type(TypeDescriptor::class("S3Disk").implements("Filesystem"))
        .with_type(TypeDescriptor::interface("Controller"))
        .with_type(
            TypeDescriptor::class("BaseController")
                .implements("Controller")
                .constructor(vec![Param::new("disk").typed("Filesystem")], |this, args| {
                    this.set("disk", args[0].clone());
                    Ok(())
                }),
        )
        .with_type(TypeDescriptor::class("PhotoController").extends("BaseController"))
        .with_type(TypeDescriptor::class("VideoController").extends("BaseController"))
        .with_type(
            TypeDescriptor::class("Uploader")
                .constructor(
                    vec![Param::new("bucket").typed("string"), Param::new("retries").typed("int").with_default(1)],
                    |this, args| {
                        this.set("bucket", args[0].clone());
                        this.set("retries", args[1].clone());
                        Ok(())
                    },
                ),
        )
}

fn disk_type(container: &Container, controller: &str) -> String {
    let built = container.call(controller, Args::new()).unwrap();
    let disk = built.as_object().unwrap().get("disk");
    disk.as_object().unwrap().type_name().to_string()
}

#[test]
fn test_binding_applies_only_to_its_declaring_type() {
    let container = Container::new(storage_types());
    container.when("BaseController").needs("Filesystem").give("S3Disk");

    assert_eq!(disk_type(&container, "BaseController"), "S3Disk");

    let uploader = container.call("Uploader", Args::new().with("bucket", "media")).unwrap();
    assert_eq!(uploader.as_object().unwrap().get("retries"), Value::Int(1));
}

#[test]
fn test_inherited_constructor_uses_ancestor_bindings() {
    let container = Container::new(storage_types());
    container.when("BaseController").needs("Filesystem").give("LocalDisk");

    // Inherited constructors declare their parameters on the ancestor
    assert_eq!(disk_type(&container, "PhotoController"), "LocalDisk");
}

#[test]
fn test_types_without_bindings_use_the_nearest_ancestor() {
    let types = storage_types().with_type(
        TypeDescriptor::class("ThumbnailController")
            .extends("PhotoController")
            .constructor(vec![Param::new("disk").typed("Filesystem")], |this, args| {
                this.set("disk", args[0].clone());
                Ok(())
            }),
    );
    let container = Container::new(types);
    container.when("BaseController").needs("Filesystem").give("LocalDisk");
    container.when("PhotoController").needs("Filesystem").give("S3Disk");

    assert_eq!(disk_type(&container, "ThumbnailController"), "S3Disk");
}

#[test]
fn test_bindings_fall_back_to_interfaces() {
    let container = Container::new(storage_types());
    container.when("Controller").needs("Filesystem").give("S3Disk");

    assert_eq!(disk_type(&container, "BaseController"), "S3Disk");
}

#[test]
fn test_own_bindings_win_over_interface_bindings() {
    let container = Container::new(storage_types());
    container.when("Controller").needs("Filesystem").give("S3Disk");
    container.when("BaseController").needs("Filesystem").give("LocalDisk");

    assert_eq!(disk_type(&container, "BaseController"), "LocalDisk");
}

#[test]
fn test_when_any_binds_several_types() {
    let types = storage_types().with_type(
        TypeDescriptor::class("Archiver")
            .constructor(vec![Param::new("disk").typed("Filesystem")], |this, args| {
                this.set("disk", args[0].clone());
                Ok(())
            }),
    );
    let container = Container::new(types);
    container.when_any(["BaseController", "Archiver"]).needs("Filesystem").give("S3Disk");

    assert_eq!(disk_type(&container, "BaseController"), "S3Disk");
    assert_eq!(disk_type(&container, "Archiver"), "S3Disk");
}

#[test]
fn test_parameter_name_binding_with_literal() {
    let container = Container::new(storage_types());
    container.when("Uploader").needs("$bucket").give(Value::from("photos"));
    container.when("Uploader").needs("$retries").give(Value::Int(5));

    let uploader = container.call("Uploader", Args::new()).unwrap();
    let uploader = uploader.as_object().unwrap();
    assert_eq!(uploader.get("bucket"), Value::from("photos"));
    assert_eq!(uploader.get("retries"), Value::Int(5));
}

#[test]
fn test_name_binding_resolves_container_keys() {
    let container = Container::new(storage_types());
    container.instance("uploads.bucket", "from-container");
    container.when("Uploader").needs("$bucket").give("uploads.bucket");

    let uploader = container.call("Uploader", Args::new()).unwrap();
    assert_eq!(uploader.as_object().unwrap().get("bucket"), Value::from("from-container"));
}

#[test]
fn test_unresolvable_name_binding_keeps_raw_value() {
    let container = Container::new(storage_types());
    container.when("Uploader").needs("$bucket").give("plain-bucket-name");

    let uploader = container.call("Uploader", Args::new()).unwrap();
    assert_eq!(uploader.as_object().unwrap().get("bucket"), Value::from("plain-bucket-name"));
}

#[test]
fn test_config_binding_reads_configuration() {
    let container = Container::new(storage_types());
    container.config_mut().set("uploads.bucket", "configured");
    container.when("Uploader").needs("$bucket").give_config("uploads.bucket", "default-bucket");

    let uploader = container.call("Uploader", Args::new()).unwrap();
    assert_eq!(uploader.as_object().unwrap().get("bucket"), Value::from("configured"));
}

#[test]
fn test_config_binding_default() {
    let container = Container::new(storage_types());
    container.when("Uploader").needs("$bucket").give_config("uploads.bucket", "default-bucket");

    let uploader = container.call("Uploader", Args::new()).unwrap();
    assert_eq!(uploader.as_object().unwrap().get("bucket"), Value::from("default-bucket"));
}

#[test]
fn test_callable_binding_is_invoked_once_per_type() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let make_bucket = Callable::closure(vec![], move |_| {
        counter.set(counter.get() + 1);
        Ok(Value::from("generated"))
    });

    let container = Container::new(storage_types());
    container.when("Uploader").needs("$bucket").give(make_bucket);

    for _ in 0..3 {
        let uploader = container.call("Uploader", Args::new()).unwrap();
        assert_eq!(uploader.as_object().unwrap().get("bucket"), Value::from("generated"));
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_adding_a_binding_refreshes_resolved_bindings() {
    let container = Container::new(storage_types());
    container.when("Uploader").needs("$bucket").give(Value::from("first"));
    let first = container.call("Uploader", Args::new()).unwrap();
    assert_eq!(first.as_object().unwrap().get("bucket"), Value::from("first"));

    container.when("Uploader").needs("$bucket").give(Value::from("second"));
    let second = container.call("Uploader", Args::new()).unwrap();
    assert_eq!(second.as_object().unwrap().get("bucket"), Value::from("second"));
}

#[test]
fn test_needs_is_de_aliased() {
    let container = Container::new(storage_types());
    container.alias("fs", "Filesystem");
    container.when("BaseController").needs("fs").give("S3Disk");

    assert_eq!(disk_type(&container, "BaseController"), "S3Disk");
}

#[test]
fn test_reference_and_target_implementations() {
    let container = Container::new(storage_types());
    container.define_shared("disk.local", "LocalDisk").unwrap();
    container.add_contextual_binding("BaseController", "Filesystem", Implementation::from(reference("disk.local")));

    let built = container.call("BaseController", Args::new()).unwrap();
    assert_eq!(built.as_object().unwrap().get("disk"), container.get("disk.local").unwrap());

    let other = Container::new(storage_types());
    other.add_contextual_binding("BaseController", "Filesystem", Implementation::from(Target::from("S3Disk")));
    assert_eq!(disk_type(&other, "VideoController"), "S3Disk");
}

#[test]
fn test_mixin_injectors_use_the_bindings_of_the_using_type() {
    let types = TypeRegistry::new()
        .with_type(
            TypeDescriptor::mixin("HasLabel")
                .method("injectLabel", vec![Param::new("label").typed("string")], |this, args| {
                    this.set("label", args[0].clone());
                    Ok(Value::Null)
                }),
        )
        .with_type(TypeDescriptor::class("Widget").uses("HasLabel"))
        .with_type(TypeDescriptor::class("FancyWidget").extends("Widget"));
    let container = Container::new(types);
    container.when("Widget").needs("$label").give(Value::from("widget-label"));

    let widget = container.call("Widget", Args::new()).unwrap();
    assert_eq!(widget.as_object().unwrap().get("label"), Value::from("widget-label"));

    let fancy = container.call("FancyWidget", Args::new()).unwrap();
    assert_eq!(fancy.as_object().unwrap().get("label"), Value::from("widget-label"));
}

#[test]
fn test_mixin_failures_name_the_using_type() {
    let types = TypeRegistry::new()
        .with_type(TypeDescriptor::mixin("HasLabel").method(
            "injectLabel",
            vec![Param::new("label").typed("string")],
            |_, _| Ok(Value::Null),
        ))
        .with_type(TypeDescriptor::class("Widget").uses("HasLabel"));
    let container = Container::new(types);

    let err = container.call("Widget", Args::new()).unwrap_err();
    assert!(err.full_message().contains("Widget::injectLabel"), "{}", err.full_message());
    assert!(!err.full_message().contains("HasLabel"));
}
