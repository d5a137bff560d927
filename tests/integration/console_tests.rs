//! Console dispatch against the reference custom module.

use std::sync::Arc;

use motorapp::app::controller::ModuleController;
use motorapp::app::custom::CustomApp;
use motorapp::error::CommandError;

use crate::mock_hw::{MockGate, MockLiveness, fast_config, registries};

#[test]
fn chip_select_commands_reach_the_gate_only_while_running() {
    let (callbacks, commands) = registries();
    let gate = Arc::new(MockGate::default());
    let app = Arc::new(CustomApp::new(gate.clone()));
    let mut ctl = ModuleController::new(
        app,
        callbacks,
        commands,
        Arc::new(MockLiveness::default()),
        fast_config(),
    )
    .unwrap();

    assert_eq!(
        commands.execute_line("spi_cs_low"),
        Err(CommandError::UnknownCommand)
    );

    ctl.start().unwrap();
    commands.execute_line("spi_cs_low").unwrap();
    assert_eq!(gate.last(), Some(false));
    commands.execute_line("spi_cs_high").unwrap();
    assert_eq!(gate.last(), Some(true));
    commands.execute_line("help").unwrap();

    let names: Vec<_> = commands.entries().iter().map(|e| e.name).collect();
    assert_eq!(names, ["spi_cs_low", "spi_cs_high"]);

    ctl.stop().unwrap();
    for name in ["spi_cs_low", "spi_cs_high"] {
        assert_eq!(
            commands.execute_line(name),
            Err(CommandError::UnknownCommand)
        );
    }
    assert_eq!(gate.count(), 2);
}

#[test]
fn modules_share_one_namespace() {
    let (callbacks, commands) = registries();
    let gate = Arc::new(MockGate::default());

    // Another firmware component already owns a name the module wants.
    let foreign: Arc<dyn motorapp::app::ports::CommandHandler> =
        Arc::new(crate::mock_hw::CallCounter::default());
    commands
        .register("spi_cs_high", "foreign", "", foreign.clone())
        .unwrap();

    let mut ctl = ModuleController::new(
        Arc::new(CustomApp::new(gate)),
        callbacks,
        commands,
        Arc::new(MockLiveness::default()),
        fast_config(),
    )
    .unwrap();

    assert!(ctl.start().is_err());
    assert!(!commands.contains("spi_cs_low"));
    assert_eq!(commands.entries()[0].help_summary, "foreign");

    assert_eq!(commands.unregister_by_handler(&foreign), 1);
    ctl.start().unwrap();
    assert_eq!(commands.len(), 2);
    ctl.stop().unwrap();
}
