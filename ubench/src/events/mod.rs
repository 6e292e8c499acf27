//! The per-micro-architecture catalogue of raw PMU events.
//!
//! The generic `PERF_TYPE_HARDWARE` counters are portable, but everything
//! interesting about a micro-kernel (port pressure, move elimination,
//! decoder behavior, store-forwarding stalls) lives behind raw event
//! encodings that are only valid on the processor generation they were
//! documented for. This module holds those tables, transcribed from the
//! vendor software-developer manuals, and selects the one that matches the
//! running CPU.
//!
//! Selection is by `(display family, display model)`; a processor no table
//! covers simply gets no model-specific events, which is not an error.

use crate::cpuid::CpuInfo;

pub mod amd;
pub mod intel;

/// One raw PMU event: a name for reporting, and the fields of the
/// architectural event-select register it encodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventDesc {
    /// The event name as the vendor manual spells it.
    pub name: &'static str,
    /// Event selector byte.
    pub event: u8,
    /// Unit mask byte.
    pub umask: u8,
    /// Counter-mask threshold; 0 disables thresholding.
    pub cmask: u8,
    /// Invert the counter-mask comparison.
    pub inv: bool,
    /// Count edges rather than cycles.
    pub edge: bool,
}

impl EventDesc {
    /// Describe an event by selector and unit mask, with no threshold,
    /// inversion, or edge detection.
    pub const fn new(name: &'static str, event: u8, umask: u8) -> EventDesc {
        EventDesc {
            name,
            event,
            umask,
            cmask: 0,
            inv: false,
            edge: false,
        }
    }

    /// Apply a counter-mask threshold.
    pub const fn cmask(mut self, cmask: u8) -> EventDesc {
        self.cmask = cmask;
        self
    }

    /// Invert the counter-mask comparison.
    pub const fn inv(mut self) -> EventDesc {
        self.inv = true;
        self
    }

    /// Count edges instead of cycles.
    pub const fn edge(mut self) -> EventDesc {
        self.edge = true;
        self
    }

    /// The `perf_event_attr::config` value for this event when opened with
    /// `PERF_TYPE_RAW`.
    ///
    /// The layout follows the kernel's x86 raw-event convention:
    /// `event | umask << 8 | edge << 18 | inv << 23 | cmask << 24`.
    pub fn config(&self) -> u64 {
        self.event as u64
            | (self.umask as u64) << 8
            | (self.edge as u64) << 18
            | (self.inv as u64) << 23
            | (self.cmask as u64) << 24
    }
}

/// Select the event table for the given processor.
///
/// Returns the empty slice when no table covers the processor; the two
/// generic hardware counters are still available in that case.
pub fn model_events(cpu: CpuInfo) -> &'static [EventDesc] {
    match (cpu.display_family, cpu.display_model) {
        (0x06, 0x3D | 0x47) => intel::BROADWELL,
        (0x06, 0x3C | 0x45 | 0x46) => intel::HASWELL,
        (0x06, 0x3A) => intel::IVY_BRIDGE,
        (0x06, 0x1C | 0x26 | 0x27 | 0x35 | 0x36) => intel::ATOM,
        (0x15, model) if model & !0xF == 0x00 => amd::BULLDOZER,
        (0x15, model) if model & !0xF == 0x30 => amd::STEAMROLLER,
        (0x14, model) if model & !0xF == 0x00 => amd::BOBCAT,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_packs_all_fields() {
        let desc = EventDesc::new("UOPS_RETIRED.ALL.STALLS", 0xC2, 0x01)
            .cmask(1)
            .inv();
        assert_eq!(
            desc.config(),
            0xC2 | (0x01 << 8) | (0 << 18) | (1 << 23) | (1 << 24)
        );

        let desc = EventDesc::new("PAGE_WALKS.WALKS", 0x0C, 0x03).edge();
        assert_eq!(desc.config(), 0x0C | (0x03 << 8) | (1 << 18));
    }

    #[test]
    fn every_catalogue_entry_matches_the_encoding_formula() {
        let tables = [
            intel::BROADWELL,
            intel::HASWELL,
            intel::IVY_BRIDGE,
            intel::ATOM,
            amd::BULLDOZER,
            amd::STEAMROLLER,
            amd::BOBCAT,
        ];
        for table in tables {
            for desc in table {
                let expected = desc.event as u64
                    | (desc.umask as u64) << 8
                    | (desc.edge as u64) << 18
                    | (desc.inv as u64) << 23
                    | (desc.cmask as u64) << 24;
                assert_eq!(desc.config(), expected, "{}", desc.name);
            }
        }
    }

    #[test]
    fn broadwell_models_select_broadwell() {
        for model in [0x3D, 0x47] {
            let cpu = CpuInfo {
                display_family: 0x06,
                display_model: model,
            };
            assert_eq!(model_events(cpu).as_ptr(), intel::BROADWELL.as_ptr());
        }
    }

    #[test]
    fn amd_selection_masks_the_low_model_nibble() {
        let steamroller = CpuInfo {
            display_family: 0x15,
            display_model: 0x38,
        };
        assert_eq!(
            model_events(steamroller).as_ptr(),
            amd::STEAMROLLER.as_ptr()
        );

        let bulldozer = CpuInfo {
            display_family: 0x15,
            display_model: 0x01,
        };
        assert_eq!(model_events(bulldozer).as_ptr(), amd::BULLDOZER.as_ptr());

        let bobcat = CpuInfo {
            display_family: 0x14,
            display_model: 0x02,
        };
        assert_eq!(model_events(bobcat).as_ptr(), amd::BOBCAT.as_ptr());
    }

    #[test]
    fn unknown_cpu_gets_no_model_events() {
        let cpu = CpuInfo {
            display_family: 0x06,
            display_model: 0x9A,
        };
        assert!(model_events(cpu).is_empty());

        let cpu = CpuInfo {
            display_family: 0x17,
            display_model: 0x01,
        };
        assert!(model_events(cpu).is_empty());
    }

    #[test]
    fn tables_are_nonempty_and_named() {
        for table in [
            intel::BROADWELL,
            intel::HASWELL,
            intel::IVY_BRIDGE,
            intel::ATOM,
            amd::BULLDOZER,
            amd::STEAMROLLER,
            amd::BOBCAT,
        ] {
            assert!(!table.is_empty());
            for desc in table {
                assert!(!desc.name.is_empty());
            }
        }
    }
}
