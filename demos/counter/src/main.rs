use stately_core::*;
use stately_devtools::TransitionLog;

fn counter(log: &TransitionLog) -> anyhow::Result<ComponentDef> {
    let mut def = ComponentDef::new("counter");
    def.attributes(json!({ "initial_number": 10, "step": 1 }));
    def.initial_state(
        StateFields::<Component>::new()
            .value("alive", true)
            .value("count", 0)
            .computed("current", from_attr("initial_number")),
    )?;
    def.setup({
        let log = log.clone();
        move |c| {
            log.attach(c);
            Ok(())
        }
    });
    def.after_initialize(|c| {
        c.after_state_changed(|c, state, previous| {
            if let Some(prev) = previous
                && prev.get("count") != state.get("count")
            {
                let count = state.get("count").unwrap_or(&Value::Null);
                log::info!("{}: count is now {}", c.name(), count);
            }
        });
    });
    Ok(def)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let log = TransitionLog::new();
    let def = counter(&log)?;
    let mut a = def.initialize(())?;
    let mut b = def.initialize(json!({ "initial_number": 42, "step": 5 }))?;

    let count = from_state::<Component>("count");
    let set_count = to_state::<Component>("count");
    let step = from_attr::<Component>("step");

    for c in [&mut a, &mut b] {
        for _ in 0..3 {
            let next = count(&*c).and_then(|v| v.as_i64()).unwrap_or(0)
                + step(&*c).and_then(|v| v.as_i64()).unwrap_or(1);
            set_count(&mut *c, json!(next));
        }
    }
    a.replace_state(json!({ "alive": false }));

    println!("a = {}", a.state());
    println!("b = {}", b.state());
    for line in log.lines() {
        println!("{line}");
    }
    Ok(())
}
