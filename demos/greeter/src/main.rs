use std::{process::ExitCode, sync::Arc};

use tracing_subscriber::EnvFilter;
use wiring_config::{EnvProperties, LayeredProperties, PropertyMap};
use wiring_di::{
    Condition, Context, Definition, Dependency, DynError, PropertyIdentifier, PropertyKind,
    TypeHierarchy,
};

trait Greeter: Send + Sync {
    fn greet(&self, who: &str) -> String;
}

struct English;
impl Greeter for English {
    fn greet(&self, who: &str) -> String {
        format!("Hello {who}")
    }
}

struct German;
impl Greeter for German {
    fn greet(&self, who: &str) -> String {
        format!("Hallo {who}")
    }
}

struct Shouting {
    inner: Arc<dyn Greeter>,
}
impl Greeter for Shouting {
    fn greet(&self, who: &str) -> String {
        self.inner.greet(who).to_uppercase()
    }
}

struct GreetingService {
    greeters: Vec<Arc<dyn Greeter>>,
    audience: Vec<String>,
    repeat: u32,
}
impl GreetingService {
    fn run(&self) {
        for _ in 0..self.repeat {
            for greeter in &self.greeters {
                for who in &self.audience {
                    println!("{}", greeter.greet(who));
                }
            }
        }
    }
}

fn definitions() -> Vec<Definition> {
    vec![
        Definition::builder::<English>()
            .named("english")
            .factory(|_| Ok::<_, DynError>(English)),
        Definition::builder::<German>()
            .named("german")
            .condition(Condition::equals("greeter.german", "true"))
            .factory(|_| Ok::<_, DynError>(German)),
        Definition::builder::<Shouting>()
            .named("shouting")
            .depends_on(Dependency::named::<dyn Greeter>("english"))
            .condition(Condition::present("greeter.shout"))
            .factory(|args| {
                Ok::<_, DynError>(Shouting {
                    inner: args.single(0)?,
                })
            }),
        Definition::builder::<GreetingService>()
            .depends_on(Dependency::list::<dyn Greeter>())
            .depends_on(
                PropertyIdentifier::new("greeting.audience")
                    .kind(PropertyKind::List)
                    .default_value("World"),
            )
            .depends_on(
                PropertyIdentifier::new("greeting.repeat")
                    .kind(PropertyKind::Integer)
                    .default_value("1"),
            )
            .factory(|args| {
                Ok::<_, DynError>(GreetingService {
                    greeters: args.list(0)?,
                    audience: args.property(1)?,
                    repeat: args.property(2)?,
                })
            }),
    ]
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wiring_di=debug")),
        )
        .init();

    let mut defaults = PropertyMap::new();
    defaults.set_property("greeter.german", "true");
    defaults.set_property("greeting.audience", "World, Rust");

    let properties = LayeredProperties::new()
        .with_layer(EnvProperties::with_prefix("GREETER"))
        .with_layer(defaults);

    let hierarchy = TypeHierarchy::new()
        .with::<English, dyn Greeter>(|english| english)
        .with::<German, dyn Greeter>(|german| german)
        .with::<Shouting, dyn Greeter>(|shouting| shouting);

    let context = Context::builder()
        .with_properties(properties)
        .with_hierarchy(hierarchy)
        .add_source(&definitions())
        .build();

    let context = match context {
        Ok(context) => context,
        Err(e) => {
            tracing::error!("Could not wire the application: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("Wired {} singletons: {:?}", context.size(), context);

    match context.require::<GreetingService>() {
        Ok(service) => {
            service.run();
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
