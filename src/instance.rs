//! Instance models exchanged with the Ganeti remote API.
//!
//! The API accepts memory as a unit-suffixed string on write (`"2G"`) but
//! reports it as a raw integer on read. The two shapes are kept as distinct
//! types: [`InstanceSpec`] is what callers submit, [`InstanceInfo`] is what
//! the cluster reports. [`format_memory`] bridges the read side back to the
//! write side's notation for display; it is lossy and never parsed back.

use serde::{Deserialize, Serialize};

use crate::rapi::RapiError;

/// Schema version tag attached to every creation request.
pub const INSTANCE_SCHEMA_VERSION: u32 = 1;

/// Disk template used when the caller does not pick one.
pub const DEFAULT_DISK_TEMPLATE: &str = "plain";

/// A disk attached to a new instance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    /// Disk size with a unit suffix, for example `20G`.
    pub size: String,
}

/// A network interface attached to a new instance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Nic {
    /// Network link to bind to on the hypervisor, for example `br0`.
    pub link: String,
}

/// Compute resources requested for a new instance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BackendParams {
    /// Memory with a unit suffix, for example `2G`.
    pub memory: String,
    /// Number of virtual CPUs.
    pub vcpus: u32,
}

/// Operation mode of a creation request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceMode {
    /// Create a fresh instance.
    #[default]
    Create,
}

/// Desired specification submitted to create an instance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Compute resources.
    #[serde(rename = "beparams")]
    pub backend_params: BackendParams,
    /// Disks in attachment order. Never empty.
    pub disks: Vec<Disk>,
    /// Storage backend template.
    pub disk_template: String,
    /// Node group to place the instance in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// Hypervisor to spawn the instance on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypervisor: Option<String>,
    /// Instance name; doubles as its identifier for later calls.
    #[serde(rename = "instance_name")]
    pub name: String,
    /// Operation mode tag.
    pub mode: InstanceMode,
    /// Network interfaces in attachment order. Never empty.
    pub nics: Vec<Nic>,
    /// Primary node to spawn the instance on.
    #[serde(
        rename = "pnode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub node: Option<String>,
    /// Operating system definition used to bootstrap the instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    /// Request schema version.
    #[serde(rename = "__version__")]
    pub version: u32,
}

impl InstanceSpec {
    /// Starts a builder for an [`InstanceSpec`].
    #[must_use]
    pub fn builder() -> InstanceSpecBuilder {
        InstanceSpecBuilder::new()
    }

    /// Checks the preconditions the remote API expects of a creation
    /// request.
    ///
    /// # Errors
    ///
    /// Returns [`RapiError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), RapiError> {
        if self.name.trim().is_empty() {
            return Err(RapiError::Validation(String::from("name")));
        }
        if self.backend_params.memory.trim().is_empty() {
            return Err(RapiError::Validation(String::from("memory")));
        }
        if self.backend_params.vcpus == 0 {
            return Err(RapiError::Validation(String::from("vcpus")));
        }
        if self.disks.is_empty() {
            return Err(RapiError::Validation(String::from("disks")));
        }
        if self.nics.is_empty() {
            return Err(RapiError::Validation(String::from("nics")));
        }
        if self.disk_template.trim().is_empty() {
            return Err(RapiError::Validation(String::from("disk_template")));
        }
        Ok(())
    }
}

/// Builder for [`InstanceSpec`] that trims inputs and validates on build.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstanceSpecBuilder {
    name: String,
    memory: String,
    vcpus: u32,
    disks: Vec<Disk>,
    nics: Vec<Nic>,
    disk_template: Option<String>,
    group_name: Option<String>,
    hypervisor: Option<String>,
    node: Option<String>,
    os_type: Option<String>,
}

impl InstanceSpecBuilder {
    /// Creates an empty builder; fields must be populated before build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instance name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    /// Sets the memory size, for example `2G`.
    #[must_use]
    pub fn memory(mut self, value: impl Into<String>) -> Self {
        self.memory = value.into();
        self
    }

    /// Sets the virtual CPU count.
    #[must_use]
    pub const fn vcpus(mut self, value: u32) -> Self {
        self.vcpus = value;
        self
    }

    /// Appends a disk of the given size.
    #[must_use]
    pub fn disk(mut self, size: impl Into<String>) -> Self {
        self.disks.push(Disk { size: size.into() });
        self
    }

    /// Appends a network interface bound to the given link.
    #[must_use]
    pub fn nic(mut self, link: impl Into<String>) -> Self {
        self.nics.push(Nic { link: link.into() });
        self
    }

    /// Sets the disk template. Defaults to [`DEFAULT_DISK_TEMPLATE`].
    #[must_use]
    pub fn disk_template(mut self, value: Option<String>) -> Self {
        self.disk_template = value;
        self
    }

    /// Sets the optional node group.
    #[must_use]
    pub fn group_name(mut self, value: Option<String>) -> Self {
        self.group_name = value;
        self
    }

    /// Sets the optional hypervisor.
    #[must_use]
    pub fn hypervisor(mut self, value: Option<String>) -> Self {
        self.hypervisor = value;
        self
    }

    /// Sets the optional primary node.
    #[must_use]
    pub fn node(mut self, value: Option<String>) -> Self {
        self.node = value;
        self
    }

    /// Sets the optional OS definition.
    #[must_use]
    pub fn os_type(mut self, value: Option<String>) -> Self {
        self.os_type = value;
        self
    }

    /// Builds and validates the [`InstanceSpec`]. Blank optional values are
    /// dropped so they are omitted from the wire payload.
    ///
    /// # Errors
    ///
    /// Returns [`RapiError::Validation`] when a required field is empty or
    /// no disk or network interface was added.
    pub fn build(self) -> Result<InstanceSpec, RapiError> {
        let spec = InstanceSpec {
            backend_params: BackendParams {
                memory: self.memory.trim().to_owned(),
                vcpus: self.vcpus,
            },
            disks: self
                .disks
                .into_iter()
                .map(|disk| Disk {
                    size: disk.size.trim().to_owned(),
                })
                .collect(),
            disk_template: non_blank(self.disk_template)
                .unwrap_or_else(|| DEFAULT_DISK_TEMPLATE.to_owned()),
            group_name: non_blank(self.group_name),
            hypervisor: non_blank(self.hypervisor),
            name: self.name.trim().to_owned(),
            mode: InstanceMode::Create,
            nics: self
                .nics
                .into_iter()
                .map(|nic| Nic {
                    link: nic.link.trim().to_owned(),
                })
                .collect(),
            node: non_blank(self.node),
            os_type: non_blank(self.os_type),
            version: INSTANCE_SCHEMA_VERSION,
        };
        spec.validate()?;
        Ok(spec)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|inner| inner.trim().to_owned())
        .filter(|inner| !inner.is_empty())
}

/// Compute resources as reported by the cluster.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BackendParamsRead {
    /// Memory as a raw integer count.
    pub memory: u64,
    /// Number of virtual CPUs.
    pub vcpus: u32,
}

/// The cluster's view of an existing instance.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct InstanceInfo {
    /// Administrative state, for example `up` or `down`.
    #[serde(default)]
    pub admin_state: String,
    /// Effective compute resources.
    #[serde(rename = "beparams")]
    pub backend_params: BackendParamsRead,
    /// Storage backend template.
    #[serde(default)]
    pub disk_template: String,
    /// Instance name.
    pub name: String,
    /// Primary node hosting the instance.
    #[serde(rename = "pnode", default)]
    pub node: String,
    /// Operating system definition.
    #[serde(rename = "os", default)]
    pub os_type: String,
    /// Runtime status, for example `running`.
    #[serde(default)]
    pub status: String,
    /// Cluster-assigned UUID.
    #[serde(default)]
    pub uuid: String,
}

impl InstanceInfo {
    /// Renders the reported memory in the unit-suffixed notation accepted on
    /// write. See [`format_memory`] for the caveats.
    #[must_use]
    pub fn memory_label(&self) -> String {
        format_memory(self.backend_params.memory)
    }
}

/// Renders a raw memory count as an integer quotient with a unit suffix.
///
/// The largest of 1024^3 (`P`), 1024^2 (`T`) and 1024 (`G`) that the value
/// reaches is selected and the quotient truncated. Anything below 1024
/// renders as `0M`: the sub-1024 remainder is discarded rather than
/// reported. Callers rely on this exact output, so it is kept as is.
#[must_use]
pub fn format_memory(bytes: u64) -> String {
    let peta = bytes >> 30;
    if peta > 0 {
        return format!("{peta}P");
    }
    let tera = bytes >> 20;
    if tera > 0 {
        return format!("{tera}T");
    }
    let giga = bytes >> 10;
    if giga > 0 {
        return format!("{giga}G");
    }
    format!("{giga}M")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    const GIB: u64 = 1024 * 1024 * 1024;

    #[rstest]
    #[case::exact_p(GIB, "1P")]
    #[case::large_p(5 * GIB + 17, "5P")]
    #[case::exact_t(MIB, "1T")]
    #[case::just_below_p(GIB - 1, "1023T")]
    #[case::exact_g(KIB, "1G")]
    #[case::truncated_g(2048 + 1023, "2G")]
    #[case::just_below_t(MIB - 1, "1023G")]
    #[case::zero(0, "0M")]
    #[case::sub_kib_loses_value(512, "0M")]
    #[case::largest_sub_kib(1023, "0M")]
    fn format_memory_selects_largest_threshold(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(format_memory(bytes), expected);
    }

    fn minimal_builder() -> InstanceSpecBuilder {
        InstanceSpec::builder()
            .name("web-01")
            .memory("2G")
            .vcpus(2)
            .disk("20G")
            .nic("br0")
    }

    #[test]
    fn builder_applies_defaults_and_trims() {
        let spec = InstanceSpec::builder()
            .name("  web-01 ")
            .memory(" 2G")
            .vcpus(2)
            .disk(" 20G ")
            .nic("br0 ")
            .hypervisor(Some(String::from("   ")))
            .build()
            .unwrap_or_else(|err| panic!("valid spec: {err}"));
        assert_eq!(spec.name, "web-01");
        assert_eq!(spec.backend_params.memory, "2G");
        assert_eq!(spec.disks, vec![Disk { size: "20G".to_owned() }]);
        assert_eq!(spec.nics, vec![Nic { link: "br0".to_owned() }]);
        assert_eq!(spec.disk_template, DEFAULT_DISK_TEMPLATE);
        assert_eq!(spec.hypervisor, None);
        assert_eq!(spec.mode, InstanceMode::Create);
        assert_eq!(spec.version, INSTANCE_SCHEMA_VERSION);
    }

    #[rstest]
    #[case::no_disks(InstanceSpec::builder().name("a").memory("1G").vcpus(1).nic("br0"), "disks")]
    #[case::no_nics(InstanceSpec::builder().name("a").memory("1G").vcpus(1).disk("1G"), "nics")]
    #[case::no_name(InstanceSpec::builder().memory("1G").vcpus(1).disk("1G").nic("br0"), "name")]
    #[case::no_vcpus(InstanceSpec::builder().name("a").memory("1G").disk("1G").nic("br0"), "vcpus")]
    #[case::no_memory(InstanceSpec::builder().name("a").vcpus(1).disk("1G").nic("br0"), "memory")]
    fn builder_rejects_incomplete_specs(#[case] builder: InstanceSpecBuilder, #[case] field: &str) {
        let err = builder.build().expect_err("spec should be rejected");
        assert!(
            matches!(&err, RapiError::Validation(name) if name == field),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn spec_serialises_to_wire_field_names() {
        let spec = minimal_builder()
            .node(Some(String::from("node1.example")))
            .build()
            .unwrap_or_else(|err| panic!("valid spec: {err}"));
        let value = serde_json::to_value(&spec).unwrap_or_else(|err| panic!("serialise: {err}"));
        assert_eq!(
            value,
            json!({
                "beparams": { "memory": "2G", "vcpus": 2 },
                "disks": [{ "size": "20G" }],
                "disk_template": "plain",
                "instance_name": "web-01",
                "mode": "create",
                "nics": [{ "link": "br0" }],
                "pnode": "node1.example",
                "__version__": 1
            })
        );
    }

    #[test]
    fn info_decodes_flat_read_model() {
        let body = json!({
            "admin_state": "up",
            "beparams": { "memory": 2048, "vcpus": 4 },
            "disk_template": "drbd",
            "name": "web-01",
            "pnode": "node1.example",
            "os": "debootstrap+default",
            "status": "running",
            "uuid": "0f1e2d3c",
            "ctime": 1_700_000_000
        });
        let info: InstanceInfo =
            serde_json::from_value(body).unwrap_or_else(|err| panic!("decode: {err}"));
        assert_eq!(info.backend_params.memory, 2048);
        assert_eq!(info.backend_params.vcpus, 4);
        assert_eq!(info.os_type, "debootstrap+default");
        assert_eq!(info.memory_label(), "2G");
    }
}
