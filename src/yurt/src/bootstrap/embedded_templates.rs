//! Embedded configuration templates, compiled into the binary with `include_str!`
//! and registered with the TemplateRenderer.

/// Yurthub static pod manifest
pub const YURTHUB_MANIFEST: &str = include_str!("templates/yurthub/yurthub-ack.yaml.j2");

/// Kubelet kubeconfig pointing at the local yurthub
pub const KUBELET_CONFIG: &str = include_str!("templates/kubelet/kubelet.conf.j2");

pub const YURTHUB_MANIFEST_TEMPLATE: &str = "yurthub/yurthub-ack.yaml.j2";
pub const KUBELET_CONFIG_TEMPLATE: &str = "kubelet/kubelet.conf.j2";

/// All embedded templates as (name, content) pairs for registration with Tera.
pub const ALL_TEMPLATES: &[(&str, &str)] = &[
    (YURTHUB_MANIFEST_TEMPLATE, YURTHUB_MANIFEST),
    (KUBELET_CONFIG_TEMPLATE, KUBELET_CONFIG),
];
