use crate::contract::model::{
    Message, Note, Package, PlanEntry, Role, Supplier, Thread, TrackedEvent, User,
};
use crate::infra::storage::entity::{
    EventEntity, MessageEntity, NoteEntity, PackageEntity, PlanEntity, SupplierEntity,
    ThreadEntity, UserEntity,
};

/// Unknown roles in hand-edited files get the least privileged role.
fn role_from_str(raw: &str, record_id: &str) -> Role {
    Role::parse(raw).unwrap_or_else(|| {
        tracing::warn!(record_id, role = raw, "unknown role in datastore; treating as customer");
        Role::Customer
    })
}

impl From<UserEntity> for User {
    fn from(e: UserEntity) -> Self {
        Self {
            role: role_from_str(&e.role, &e.id),
            id: e.id,
            name: e.name,
            email: e.email,
            password_hash: e.password_hash,
            notify: e.notify,
            created_at: e.created_at,
        }
    }
}

impl From<User> for UserEntity {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role.as_str().to_string(),
            password_hash: u.password_hash,
            notify: u.notify,
            created_at: u.created_at,
        }
    }
}

impl From<SupplierEntity> for Supplier {
    fn from(e: SupplierEntity) -> Self {
        Self {
            id: e.id,
            owner_user_id: e.owner_user_id,
            name: e.name,
            category: e.category,
            location: e.location,
            price_display: e.price_display,
            website: e.website,
            license: e.license,
            amenities: e.amenities,
            max_guests: e.max_guests,
            photos: e.photos,
            description_short: e.description_short,
            description_long: e.description_long,
            email: e.email,
            approved: e.approved,
        }
    }
}

impl From<Supplier> for SupplierEntity {
    fn from(s: Supplier) -> Self {
        Self {
            id: s.id,
            owner_user_id: s.owner_user_id,
            name: s.name,
            category: s.category,
            location: s.location,
            price_display: s.price_display,
            website: s.website,
            license: s.license,
            amenities: s.amenities,
            max_guests: s.max_guests,
            photos: s.photos,
            description_short: s.description_short,
            description_long: s.description_long,
            email: s.email,
            approved: s.approved,
        }
    }
}

impl From<PackageEntity> for Package {
    fn from(e: PackageEntity) -> Self {
        Self {
            id: e.id,
            supplier_id: e.supplier_id,
            title: e.title,
            description: e.description,
            price: e.price,
            image: e.image,
            approved: e.approved,
            featured: e.featured,
        }
    }
}

impl From<Package> for PackageEntity {
    fn from(p: Package) -> Self {
        Self {
            id: p.id,
            supplier_id: p.supplier_id,
            title: p.title,
            description: p.description,
            price: p.price,
            image: p.image,
            approved: p.approved,
            featured: p.featured,
        }
    }
}

impl From<PlanEntity> for PlanEntry {
    fn from(e: PlanEntity) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            supplier_id: e.supplier_id,
            created_at: e.created_at,
        }
    }
}

impl From<PlanEntry> for PlanEntity {
    fn from(p: PlanEntry) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            supplier_id: p.supplier_id,
            created_at: p.created_at,
        }
    }
}

impl From<NoteEntity> for Note {
    fn from(e: NoteEntity) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            text: e.text,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl From<ThreadEntity> for Thread {
    fn from(e: ThreadEntity) -> Self {
        Self {
            id: e.id,
            supplier_id: e.supplier_id,
            supplier_name: e.supplier_name,
            customer_id: e.customer_id,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

impl From<Thread> for ThreadEntity {
    fn from(t: Thread) -> Self {
        Self {
            id: t.id,
            supplier_id: t.supplier_id,
            supplier_name: t.supplier_name,
            customer_id: t.customer_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

impl From<MessageEntity> for Message {
    fn from(e: MessageEntity) -> Self {
        Self {
            from_role: role_from_str(&e.from_role, &e.id),
            id: e.id,
            thread_id: e.thread_id,
            from_user_id: e.from_user_id,
            text: e.text,
            created_at: e.created_at,
        }
    }
}

impl From<Message> for MessageEntity {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            from_user_id: m.from_user_id,
            from_role: m.from_role.as_str().to_string(),
            text: m.text,
            created_at: m.created_at,
        }
    }
}

impl From<EventEntity> for TrackedEvent {
    fn from(e: EventEntity) -> Self {
        Self {
            id: e.id,
            kind: e.kind,
            meta: e.meta,
            created_at: e.created_at,
        }
    }
}

impl From<TrackedEvent> for EventEntity {
    fn from(e: TrackedEvent) -> Self {
        Self {
            id: e.id,
            kind: e.kind,
            meta: e.meta,
            created_at: e.created_at,
        }
    }
}
