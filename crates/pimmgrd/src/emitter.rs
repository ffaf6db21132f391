//! Interface `config write` emitter
//!
//! Renders the committed tree as one block per user-visible interface.
//! Per-protocol parameter lines are not rendered here.

use std::cmp::Ordering;

use mcast_cfgmgr_common::render::{ConfigBuilder, MARKER};

use crate::datastore::ConfigTree;
use crate::types::DEFAULT_VRF_NAME;

/// Compares interface names with embedded numbers by value
/// (`eth2` < `eth10`).
pub fn cmp_ifname(a: &str, b: &str) -> Ordering {
    natural_cmp(a.as_bytes(), b.as_bytes()).then_with(|| a.cmp(b))
}

fn natural_cmp(mut x: &[u8], mut y: &[u8]) -> Ordering {
    loop {
        match (x.first(), y.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(c1), Some(c2)) if c1.is_ascii_digit() && c2.is_ascii_digit() => {
                let (d1, r1) = x.split_at(x.iter().take_while(|c| c.is_ascii_digit()).count());
                let (d2, r2) = y.split_at(y.iter().take_while(|c| c.is_ascii_digit()).count());
                let n1 = trim_leading_zeros(d1);
                let n2 = trim_leading_zeros(d2);
                let ord = n1.len().cmp(&n2.len()).then_with(|| n1.cmp(n2));
                if ord != Ordering::Equal {
                    return ord;
                }
                x = r1;
                y = r2;
            }
            (Some(c1), Some(c2)) => {
                if c1 != c2 {
                    return c1.cmp(c2);
                }
                x = &x[1..];
                y = &y[1..];
            }
        }
    }
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let start = digits.iter().take_while(|&&c| c == b'0').count();
    &digits[start..]
}

/// Writes every visible interface of every PIM-enabled VRF into `out`.
///
/// Returns the number of writes: the header, the description line when
/// present, and the closing marker count one each.
pub fn interface_config_write(tree: &ConfigTree, out: &mut ConfigBuilder) -> usize {
    let mut writes = 0;

    for (vrf_name, vrf) in &tree.vrfs {
        if !vrf.pim_instance {
            continue;
        }

        let mut names: Vec<&String> = vrf.interfaces.keys().collect();
        names.sort_by(|a, b| cmp_ifname(a, b));

        for name in names {
            // PIM runs implicitly on the vxlan termination device; hide it
            if vrf.vxlan_term_device.as_deref() == Some(name.as_str()) {
                continue;
            }
            let iface = &vrf.interfaces[name];

            if vrf_name == DEFAULT_VRF_NAME {
                *out += format!("interface {}", name);
            } else {
                *out += format!("interface {} vrf {}", name, vrf_name);
            }
            writes += 1;

            if let Some(desc) = &iface.description {
                *out += format!(" description {}", desc);
                writes += 1;
            }

            *out += "exit";
            *out += MARKER;
            writes += 1;
        }
    }

    writes
}
