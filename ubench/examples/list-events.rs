//! Print the raw PMU events the catalogue selects for this machine.

use ubench::events;
use ubench::CpuInfo;

fn main() {
    let cpu = CpuInfo::detect();
    println!(
        "cpu: family {:#04x}, model {:#04x}",
        cpu.display_family, cpu.display_model
    );

    let selected = events::model_events(cpu);
    if selected.is_empty() {
        println!("no model-specific events; only Cycles and Instructions are available");
        return;
    }

    for desc in selected {
        println!("{:<55} config={:#010x}", desc.name, desc.config());
    }
}
