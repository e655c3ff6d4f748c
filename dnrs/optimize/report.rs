//! The result of an optimization run and its human-readable rendering.
use std::collections::BTreeSet;
use std::fmt::{Display, Write as _};

use bitvec::prelude::*;
use tabled::{builder::Builder, grid::config::HorizontalLine, settings::Theme};

use crate::network::{Loss, Network, SwitchId};
use crate::optimize::options::{OptimizeOptions, ReportStyle};

/// The minimum-loss switching configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Total resistive loss of the whole network under the chosen
    /// configuration, root sections included.
    pub minimum_loss: Loss,
    /// Weight of the chosen decision-graph path; excludes root-section
    /// losses, which no switching decision can influence.
    pub feeder_loss: Loss,
    pub closed: BTreeSet<SwitchId>,
    pub open: BTreeSet<SwitchId>,
}

impl Solution {
    pub(crate) fn new(
        network: &Network,
        minimum_loss: Loss,
        feeder_loss: Loss,
        closed: BTreeSet<SwitchId>,
    ) -> Solution {
        let open = network
            .switch_ids()
            .filter(|switch| !closed.contains(switch))
            .collect();
        Solution {
            minimum_loss,
            feeder_loss,
            closed,
            open,
        }
    }

    /// Open switches mapped through the external numbering; `None` unless
    /// every switch of the network carries one.
    #[must_use]
    pub fn open_in_original_numbers(&self, network: &Network) -> Option<Vec<u32>> {
        let complete = network
            .switch_ids()
            .all(|switch| network.switch(switch).is_some_and(|s| s.original_number.is_some()));
        if !complete {
            return None;
        }
        self.open
            .iter()
            .map(|switch| network.switch(*switch).and_then(|s| s.original_number))
            .collect()
    }

    /// Closed/open state of every switch under the chosen configuration.
    #[must_use]
    pub fn switch_states(&self, network: &Network) -> SwitchStates {
        let switches: Vec<SwitchId> = network.switch_ids().collect();
        let states = switches
            .iter()
            .map(|switch| self.closed.contains(switch))
            .collect();
        SwitchStates { switches, states }
    }

    /// Render the solution the way the CLI prints it.
    #[must_use]
    pub fn render(&self, network: &Network, options: &OptimizeOptions) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "minimum_loss: {}", self.minimum_loss.0);
        let _ = writeln!(out, "loss_without_root_sections: {}", self.feeder_loss.0);
        if options.lower_bound {
            let bound = lower_bound(network) + self.feeder_loss;
            let _ = writeln!(out, "lower_bound_of_minimum_loss: {}", bound.0);
        }

        let open: Vec<String> = self.open.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "open_switches: [{}]", open.join(", "));
        if let Some(originals) = self.open_in_original_numbers(network) {
            let originals: Vec<String> = originals.iter().map(ToString::to_string).collect();
            let _ = writeln!(
                out,
                "open_switches_in_original_numbers: [{}]",
                originals.join(", ")
            );
        }

        if matches!(options.report_style, ReportStyle::Table) {
            let _ = writeln!(out, "{}", self.switch_states(network));
        }
        out
    }
}

/// Closed/open state of every switch, displayable as a table.
#[derive(Debug, PartialEq, Eq)]
pub struct SwitchStates {
    switches: Vec<SwitchId>,
    states: BitVec,
}

impl SwitchStates {
    #[must_use]
    pub fn is_closed(&self, switch: SwitchId) -> Option<bool> {
        let at = self.switches.iter().position(|s| *s == switch)?;
        Some(self.states[at])
    }
}

impl Display for SwitchStates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(["switch", "closed"]);
        for (switch, state) in self.switches.iter().zip(self.states.iter()) {
            builder.push_record([
                switch.to_string(),
                if *state { "1" } else { "0" }.to_string(),
            ]);
        }

        let mut style = Theme::default();
        style.insert_horizontal_line(1, HorizontalLine::full('-', '-', ' ', ' '));
        let output = builder.build().with(style).to_string();
        write!(f, "{output}")
    }
}

/// Analytic lower bound on the loss contributed by root sections.
///
/// Per phase, the total network load is shared among the roots in inverse
/// proportion to their resistances, as if all feeders joined at one ideal
/// bus; no switching configuration can do better than that split.
#[must_use]
pub fn lower_bound(network: &Network) -> Loss {
    let roots = network.root_sections();
    let mut bound = 0.0;
    for phase in 0..3 {
        let total_load: f64 = network.sections().map(|(_, section)| section.load[phase]).sum();
        let resistance_sum: f64 = roots
            .iter()
            .filter_map(|root| network.section(*root))
            .map(|section| 1.0 / section.impedance[phase].re)
            .sum();
        for root in &roots {
            let Some(section) = network.section(*root) else {
                continue;
            };
            let resistance = section.impedance[phase].re;
            let current = total_load / (resistance * resistance_sum);
            bound += (current.powi(2) * resistance).abs();
        }
    }
    Loss(bound)
}
