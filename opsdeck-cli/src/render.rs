use opsdeck_core::{roles::Role, users::User};

pub fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users found");
        return;
    }

    println!(
        "{:<6} {:<24} {:<32} {:<16} {}",
        "ID", "NAME", "EMAIL", "ROLE", "STATUS"
    );
    for u in users {
        println!(
            "{:<6} {:<24} {:<32} {:<16} {}",
            u.id,
            u.name,
            u.email,
            u.role,
            if u.active { "Active" } else { "Inactive" }
        );
    }
}

pub fn print_roles(roles: &[Role]) {
    if roles.is_empty() {
        println!("No roles found");
        return;
    }

    println!("{:<6} {:<20} {}", "ID", "ROLE", "PERMISSIONS");
    for r in roles {
        let permissions = r
            .permissions
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:<6} {:<20} {}", r.id, r.name, permissions);
    }
}
