use dxform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::{computed_string, timeouts, types};

pub fn macsec_key_association() -> ResourceSchema {
    ResourceSchema::new("dx_macsec_key_association")
        .with_description("A MACsec secret key associated with a connection or LAG")
        .attribute(
            AttributeSchema::new("connection_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("secret_arn", AttributeType::String)
                .computed()
                .force_new()
                .conflicts_with(&["ckn", "cak"]),
        )
        .attribute(
            AttributeSchema::new("ckn", types::ckn())
                .computed()
                .force_new()
                .conflicts_with(&["secret_arn"])
                .requires(&["cak"]),
        )
        .attribute(
            AttributeSchema::new("cak", AttributeType::String)
                .force_new()
                .sensitive()
                .conflicts_with(&["secret_arn"])
                .requires(&["ckn"]),
        )
        .attribute(timeouts())
        .attribute(computed_string("start_on"))
        .attribute(computed_string("state"))
}
