//! Edit batches handed to the transaction engine.

use std::fmt;

use crate::types::{AddressFamily, InterfaceKey, LeafValue, ParameterValue, PimParameter};
use crate::xpaths;

/// Typed target of an edit, relative to the PIM address-family container
/// of one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditPath {
    /// `.`: the PIM address-family container itself
    PimAddressFamily,
    /// `./pim-enable`
    PimEnable,
    /// One of the dependent parameter leaves
    PimParameter(PimParameter),
    /// The companion protocol's address-family container
    GroupMembershipAddressFamily,
}

impl EditPath {
    /// Renders the northbound xpath for this target.
    pub fn xpath(&self, family: AddressFamily) -> String {
        match self {
            EditPath::PimAddressFamily => xpaths::CURRENT_NODE.to_string(),
            EditPath::PimEnable => xpaths::pim_leaf_xpath(xpaths::leaves::PIM_ENABLE),
            EditPath::PimParameter(param) => xpaths::pim_leaf_xpath(param.leaf_name()),
            EditPath::GroupMembershipAddressFamily => xpaths::gmp_af_xpath_from_pim(family),
        }
    }

    /// Absolute xpath of this target on `key`, as reported in rejections.
    pub fn absolute_xpath(&self, key: &InterfaceKey, family: AddressFamily) -> String {
        let context = xpaths::pim_context_xpath(key, family);
        match self {
            EditPath::PimAddressFamily => context,
            EditPath::PimEnable => format!("{}/{}", context, xpaths::leaves::PIM_ENABLE),
            EditPath::PimParameter(param) => format!("{}/{}", context, param.leaf_name()),
            EditPath::GroupMembershipAddressFamily => format!(
                "{}/{}",
                xpaths::interface_xpath(key),
                xpaths::gmp_af_xpath(family)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOperation {
    Modify,
    Destroy,
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditOperation::Modify => "modify",
            EditOperation::Destroy => "destroy",
        })
    }
}

/// One (path, operation, value) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub path: EditPath,
    pub operation: EditOperation,
    pub value: Option<LeafValue>,
}

impl Edit {
    pub fn modify(path: EditPath, value: LeafValue) -> Self {
        Self {
            path,
            operation: EditOperation::Modify,
            value: Some(value),
        }
    }

    pub fn destroy(path: EditPath) -> Self {
        Self {
            path,
            operation: EditOperation::Destroy,
            value: None,
        }
    }

    pub fn pim_enable(enabled: bool) -> Self {
        Self::modify(EditPath::PimEnable, LeafValue::Bool(enabled))
    }

    pub fn set_parameter(value: ParameterValue) -> Self {
        Self::modify(EditPath::PimParameter(value.parameter()), value.leaf_value())
    }

    pub fn is_destroy(&self) -> bool {
        self.operation == EditOperation::Destroy
    }

    /// Human-readable form used in logs.
    pub fn describe(&self, family: AddressFamily) -> String {
        match self.value {
            Some(value) => format!("{} {} {}", self.operation, self.path.xpath(family), value),
            None => format!("{} {}", self.operation, self.path.xpath(family)),
        }
    }
}

/// Ordered list of edits, applied atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBatch {
    edits: Vec<Edit>,
}

impl EditBatch {
    pub fn new() -> Self {
        Self { edits: Vec::new() }
    }

    /// Enqueues an edit at the end of the batch.
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.edits.iter()
    }

    pub fn contains_destroy(&self) -> bool {
        self.edits.iter().any(Edit::is_destroy)
    }

    /// Log-friendly rendering, one edit per entry.
    pub fn describe(&self, family: AddressFamily) -> Vec<String> {
        self.edits.iter().map(|e| e.describe(family)).collect()
    }
}

impl From<Vec<Edit>> for EditBatch {
    fn from(edits: Vec<Edit>) -> Self {
        Self { edits }
    }
}

impl<'a> IntoIterator for &'a EditBatch {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_xpaths() {
        assert_eq!(EditPath::PimAddressFamily.xpath(AddressFamily::Ipv6), ".");
        assert_eq!(EditPath::PimEnable.xpath(AddressFamily::Ipv6), "./pim-enable");
        assert_eq!(
            EditPath::PimParameter(PimParameter::HelloHoldtime).xpath(AddressFamily::Ipv6),
            "./hello-holdtime"
        );
        assert!(EditPath::GroupMembershipAddressFamily
            .xpath(AddressFamily::Ipv4)
            .ends_with("[address-family='frr-routing:ipv4']"));
    }

    #[test]
    fn test_edit_describe() {
        let family = AddressFamily::Ipv6;
        assert_eq!(Edit::pim_enable(true).describe(family), "modify ./pim-enable true");
        assert_eq!(Edit::destroy(EditPath::PimAddressFamily).describe(family), "destroy .");
        assert_eq!(
            Edit::set_parameter(ParameterValue::DrPriority(10)).describe(family),
            "modify ./dr-priority 10"
        );
    }

    #[test]
    fn test_absolute_xpaths() {
        let key = InterfaceKey::new("eth0", "red");
        let iface = "/frr-interface:lib/interface[name='eth0'][vrf='red']";
        assert_eq!(
            EditPath::PimEnable.absolute_xpath(&key, AddressFamily::Ipv6),
            format!(
                "{}/frr-pim:pim/address-family[address-family='frr-routing:ipv6']/pim-enable",
                iface
            )
        );
        assert_eq!(
            EditPath::GroupMembershipAddressFamily.absolute_xpath(&key, AddressFamily::Ipv6),
            format!(
                "{}/frr-gmp:gmp/address-family[address-family='frr-routing:ipv6']",
                iface
            )
        );
    }

    #[test]
    fn test_batch_ordering() {
        let mut batch = EditBatch::new();
        batch.push(Edit::pim_enable(true));
        batch.push(Edit::set_parameter(ParameterValue::HelloInterval(30)));

        assert_eq!(batch.len(), 2);
        assert!(!batch.contains_destroy());
        assert_eq!(batch.edits()[0], Edit::pim_enable(true));
        assert_eq!(batch.iter().count(), 2);
    }
}
