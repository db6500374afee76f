// src/report.rs - Plain text tables for the CLI
use extruplan_shared::{AdjustmentSummary, ExtrusionPlanner, HotendConfig, HotendProfile, MaterialConfig, MaterialType};

pub fn summary_table(
    summary: &AdjustmentSummary,
    planner: &ExtrusionPlanner,
    hotend: &HotendConfig,
    material: &MaterialConfig,
) -> String {
    let mut out = format!("{}\n", planner);
    out.push_str(&format!(
        "hotend: {:.1} mm³/s, {:.0} ms | material: {} (Shore {}, factor {:.2})\n",
        hotend.max_volumetric_flow(),
        hotend.response_time() * 1000.0,
        material.name(),
        material.shore_hardness(),
        material.compensation_factor()
    ));
    out.push_str(&format!("{:<28}{:>12}{:>12}\n", "", "before", "after"));
    out.push_str(&format!(
        "{:<28}{:>12.2}{:>12.2}\n",
        "peak flow (mm³/s)", summary.peak_flow_before, summary.peak_flow_after
    ));
    out.push_str(&format!(
        "{:<28}{:>12}{:>12}\n",
        "segments over limit", summary.over_limit_before, summary.over_limit_after
    ));
    out.push_str(&format!(
        "adjusted {}/{} segments, max reduction {:.1}%, avg feed change {:.1}%\n",
        summary.adjusted_segments,
        summary.total_segments,
        summary.max_reduction_pct,
        summary.avg_feed_change_pct
    ));
    out
}

pub fn profiles_table() -> String {
    let mut out = String::from("Hotend profiles:\n");
    for profile in HotendProfile::ALL {
        out.push_str(&format!(
            "  {:<16}{:>6.1} mm³/s{:>6.0} ms\n",
            profile.as_str(),
            profile.max_volumetric_flow(),
            profile.response_time() * 1000.0
        ));
    }
    out.push_str("Materials:\n");
    for material in MaterialType::ALL {
        let config = material.config();
        out.push_str(&format!(
            "  {:<16}{:<14}Shore {:>3}  factor {:.2}\n",
            material.as_str(),
            config.name(),
            config.shore_hardness(),
            config.compensation_factor()
        ));
    }
    out
}
