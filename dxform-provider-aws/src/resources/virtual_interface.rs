//! Virtual interfaces
//!
//! One set of handlers serves all nine interface resources. [`VifKind`]
//! picks the interface type and its gateway attachments; [`VifRole`] picks
//! the lifecycle:
//!
//! - `Owned`: create on our connection, delete on destroy
//! - `Hosted`: allocate on our connection for another account; AWS leaves
//!   it `confirming` until that account accepts
//! - `Accepter`: confirm an interface allocated to us; destroy only forgets
//!   it, since the allocating account owns its lifetime

use dxform_core::resource::{Resource, ResourceId, State};

use crate::api::{
    NewVirtualInterface, UpdateVirtualInterfaceInput, VirtualInterface, VirtualInterfaceState,
};
use crate::arn::virtual_interface_arn;
use crate::client::{AwsClient, Timeouts};
use crate::error::{DxError, Result, ignore_messages, messages};
use crate::find;
use crate::wait::{self, InterfaceWait};

use super::attrs::{
    Attributes, StateBuilder, identifier, int32, missing, optional_bool, optional_int,
    optional_str, required_int, required_str, string_list, tags,
};
use super::tags::update_tags;
use super::{VifKind, VifRole};

fn wait_side(kind: VifKind, role: VifRole) -> InterfaceWait {
    match (kind, role) {
        (VifKind::Public, VifRole::Owned) => InterfaceWait::OwnedPublic,
        (_, VifRole::Owned) => InterfaceWait::Owned,
        (_, VifRole::Hosted) => InterfaceWait::Hosted,
        (_, VifRole::Accepter) => InterfaceWait::Accepter,
    }
}

fn new_interface(kind: VifKind, role: VifRole, attrs: &Attributes) -> Result<NewVirtualInterface> {
    let owned = role == VifRole::Owned;
    let mtu = match kind {
        VifKind::Public => None,
        _ => optional_int(attrs, "mtu")?
            .map(|mtu| int32("mtu", mtu))
            .transpose()?,
    };
    Ok(NewVirtualInterface {
        interface_type: kind.interface_type(),
        name: required_str(attrs, "name")?,
        vlan: int32("vlan", required_int(attrs, "vlan")?)?,
        asn: required_int(attrs, "bgp_asn")?,
        address_family: optional_str(attrs, "address_family"),
        amazon_address: optional_str(attrs, "amazon_address"),
        customer_address: optional_str(attrs, "customer_address"),
        auth_key: optional_str(attrs, "bgp_auth_key"),
        mtu,
        virtual_gateway_id: if owned && kind == VifKind::Private {
            optional_str(attrs, "vpn_gateway_id")
        } else {
            None
        },
        direct_connect_gateway_id: if owned && kind != VifKind::Public {
            optional_str(attrs, "dx_gateway_id")
        } else {
            None
        },
        route_filter_prefixes: if kind == VifKind::Public {
            string_list(attrs, "route_filter_prefixes")
        } else {
            Vec::new()
        },
        site_link_enabled: if owned && kind != VifKind::Public {
            optional_bool(attrs, "sitelink_enabled")
        } else {
            None
        },
        tags: if owned { tags(attrs) } else { Default::default() },
    })
}

pub async fn create(
    client: &AwsClient,
    kind: VifKind,
    role: VifRole,
    resource: &Resource,
    timeouts: Timeouts,
) -> Result<State> {
    let attrs = &resource.attributes;

    let vif_id = match role {
        VifRole::Owned => {
            let connection_id = required_str(attrs, "connection_id")?;
            let input = new_interface(kind, role, attrs)?;
            log::debug!(
                "creating Direct Connect {} Virtual Interface {} on {}",
                kind.interface_type(),
                input.name,
                connection_id
            );
            client
                .dxconn
                .create_virtual_interface(&connection_id, input)
                .await?
        }
        VifRole::Hosted => {
            let connection_id = required_str(attrs, "connection_id")?;
            let owner_account = required_str(attrs, "owner_account_id")?;
            let input = new_interface(kind, role, attrs)?;
            log::debug!(
                "allocating hosted {} Virtual Interface {} for account {}",
                kind.interface_type(),
                input.name,
                owner_account
            );
            client
                .dxconn
                .allocate_hosted_virtual_interface(&connection_id, &owner_account, input)
                .await?
        }
        VifRole::Accepter => {
            let vif_id = required_str(attrs, "virtual_interface_id")?;
            accept(client, kind, &vif_id, attrs).await?;
            vif_id
        }
    };
    log::info!("Direct Connect Virtual Interface ({}) created", vif_id);

    wait::virtual_interface_available(client, &vif_id, wait_side(kind, role), timeouts.create)
        .await?;

    let state = refresh(client, kind, role, &resource.id, &vif_id, true).await?;

    if role == VifRole::Accepter {
        let old_tags = tags(&state.attributes);
        let new_tags = tags(attrs);
        if old_tags != new_tags
            && let Some(arn) = state.attributes.get("arn").and_then(|v| v.as_str())
        {
            update_tags(client, arn, &old_tags, &new_tags).await?;
            return refresh(client, kind, role, &resource.id, &vif_id, true).await;
        }
    }
    Ok(state)
}

/// Confirm a hosted interface from the receiving account
async fn accept(client: &AwsClient, kind: VifKind, vif_id: &str, attrs: &Attributes) -> Result<()> {
    let vif = find::find_virtual_interface_by_id(client, vif_id).await?;
    check_type(kind, &vif)?;

    if vif.virtual_interface_state != VirtualInterfaceState::Confirming {
        log::info!(
            "Direct Connect Virtual Interface ({}) is {}, not confirming; skipping confirmation",
            vif_id,
            vif.virtual_interface_state
        );
        return Ok(());
    }

    let vpn_gateway_id = match kind {
        VifKind::Private => optional_str(attrs, "vpn_gateway_id"),
        _ => None,
    };
    let dx_gateway_id = match kind {
        VifKind::Public => None,
        _ => optional_str(attrs, "dx_gateway_id"),
    };
    log::debug!("confirming Direct Connect Virtual Interface ({})", vif_id);
    client
        .dxconn
        .confirm_virtual_interface(
            kind.interface_type(),
            vif_id,
            vpn_gateway_id.as_deref(),
            dx_gateway_id.as_deref(),
        )
        .await?;
    Ok(())
}

fn check_type(kind: VifKind, vif: &VirtualInterface) -> Result<()> {
    let expected = kind.interface_type().as_str();
    match vif.virtual_interface_type.as_deref() {
        Some(actual) if actual == expected => Ok(()),
        actual => Err(DxError::UnexpectedVirtualInterfaceType {
            expected: expected.to_string(),
            actual: actual.unwrap_or_default().to_string(),
        }),
    }
}

pub async fn read(client: &AwsClient, kind: VifKind, role: VifRole, prior: &State) -> Result<State> {
    refresh(client, kind, role, &prior.id, identifier(prior)?, false).await
}

async fn refresh(
    client: &AwsClient,
    kind: VifKind,
    role: VifRole,
    id: &ResourceId,
    vif_id: &str,
    is_new: bool,
) -> Result<State> {
    match find::find_virtual_interface_by_id(client, vif_id).await {
        Ok(vif) => {
            check_type(kind, &vif)?;
            Ok(to_state(client, kind, role, id, &vif))
        }
        Err(e) => missing(id, vif_id, e, is_new),
    }
}

fn to_state(
    client: &AwsClient,
    kind: VifKind,
    role: VifRole,
    id: &ResourceId,
    vif: &VirtualInterface,
) -> State {
    let region = vif.region.as_deref().unwrap_or(&client.region);
    let account = vif.owner_account.as_deref().unwrap_or_default();
    let mut b = StateBuilder::new()
        .str(
            "arn",
            virtual_interface_arn(&client.partition, region, account, &vif.virtual_interface_id),
        )
        .opt_str("aws_device", vif.aws_device.as_deref())
        .opt_str(
            "amazon_side_asn",
            vif.amazon_side_asn.map(|asn| asn.to_string()).as_deref(),
        );

    if role == VifRole::Accepter {
        b = b
            .str("virtual_interface_id", &vif.virtual_interface_id)
            .tags(&vif.tags);
        b = gateways(b, kind, vif);
        return b.build(id, &vif.virtual_interface_id);
    }

    b = b
        .opt_str("connection_id", vif.connection_id.as_deref())
        .opt_str("name", vif.virtual_interface_name.as_deref())
        .int("vlan", i64::from(vif.vlan))
        .int("bgp_asn", vif.asn)
        .opt_str("address_family", vif.address_family.as_deref())
        .opt_str("amazon_address", vif.amazon_address.as_deref())
        .opt_str("customer_address", vif.customer_address.as_deref())
        .opt_str("bgp_auth_key", vif.auth_key.as_deref())
        .opt_bool("jumbo_frame_capable", vif.jumbo_frame_capable);

    b = match kind {
        VifKind::Public => b.list("route_filter_prefixes", &vif.route_filter_prefixes),
        _ => b.opt_int("mtu", vif.mtu.map(i64::from)),
    };

    match role {
        VifRole::Owned => {
            b = b.tags(&vif.tags);
            if kind != VifKind::Public {
                b = gateways(b, kind, vif).opt_bool("sitelink_enabled", vif.site_link_enabled);
            }
        }
        VifRole::Hosted => {
            b = b.opt_str("owner_account_id", vif.owner_account.as_deref());
        }
        VifRole::Accepter => {}
    }

    b.build(id, &vif.virtual_interface_id)
}

fn gateways(b: StateBuilder, kind: VifKind, vif: &VirtualInterface) -> StateBuilder {
    match kind {
        VifKind::Private => b
            .opt_str("dx_gateway_id", vif.direct_connect_gateway_id.as_deref())
            .opt_str("vpn_gateway_id", vif.virtual_gateway_id.as_deref()),
        VifKind::Transit => b.opt_str("dx_gateway_id", vif.direct_connect_gateway_id.as_deref()),
        VifKind::Public => b,
    }
}

pub async fn update(
    client: &AwsClient,
    kind: VifKind,
    role: VifRole,
    from: &State,
    to: &Resource,
    timeouts: Timeouts,
) -> Result<State> {
    let vif_id = identifier(from)?;

    if role == VifRole::Owned && kind != VifKind::Public {
        let mtu = optional_int(&to.attributes, "mtu")?
            .filter(|mtu| optional_int(&from.attributes, "mtu").ok().flatten() != Some(*mtu))
            .map(|mtu| int32("mtu", mtu))
            .transpose()?;
        let site_link_enabled = optional_bool(&to.attributes, "sitelink_enabled")
            .filter(|enabled| optional_bool(&from.attributes, "sitelink_enabled") != Some(*enabled));

        if mtu.is_some() || site_link_enabled.is_some() {
            log::debug!(
                "updating Direct Connect Virtual Interface ({}): mtu {:?}, sitelink {:?}",
                vif_id,
                mtu,
                site_link_enabled
            );
            client
                .dxconn
                .update_virtual_interface_attributes(UpdateVirtualInterfaceInput {
                    virtual_interface_id: vif_id.to_string(),
                    name: None,
                    mtu,
                    site_link_enabled,
                })
                .await?;
            wait::virtual_interface_available(
                client,
                vif_id,
                wait_side(kind, role),
                timeouts.update,
            )
            .await?;
        }
    }

    if role != VifRole::Hosted {
        let old_tags = tags(&from.attributes);
        let new_tags = tags(&to.attributes);
        if old_tags != new_tags
            && let Some(arn) = from.attributes.get("arn").and_then(|v| v.as_str())
        {
            update_tags(client, arn, &old_tags, &new_tags).await?;
        }
    }

    refresh(client, kind, role, &to.id, vif_id, true).await
}

pub async fn delete(
    client: &AwsClient,
    kind: VifKind,
    role: VifRole,
    state: &State,
    timeouts: Timeouts,
) -> Result<()> {
    let vif_id = identifier(state)?;

    if role == VifRole::Accepter {
        log::warn!(
            "{} only forgets hosted {} Virtual Interface ({}); it is deleted by its owner",
            state.id,
            kind.interface_type(),
            vif_id
        );
        return Ok(());
    }

    log::debug!("deleting Direct Connect Virtual Interface ({})", vif_id);
    ignore_messages(
        client
            .dxconn
            .delete_virtual_interface(vif_id)
            .await
            .map(|_| ()),
        &[messages::DOES_NOT_EXIST],
    )?;
    wait::virtual_interface_deleted(client, vif_id, timeouts.delete).await
}
