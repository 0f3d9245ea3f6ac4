//! Boot-time script that opens password SSH access for one login account.
//!
//! The rendered text embeds the plaintext password (hashed on the instance with
//! `openssl passwd`), so it must never be logged.

const SSHD_CONFIG: &str = "/etc/ssh/sshd_config";

/// Quote a value for a POSIX shell single-quoted context.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// File name for the user's sudoers drop-in. sudo skips entries in
/// `sudoers.d` whose names contain `.` or end in `~`.
fn sudoers_file_name(username: &str) -> String {
    username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Render the startup script for `username` / `password`.
///
/// Inputs are not validated: an empty username yields a syntactically valid but
/// useless script.
pub fn render(username: &str, password: &str) -> String {
    let user = shell_quote(username);
    let pass = shell_quote(password);
    let sudoers = shell_quote(&format!("/etc/sudoers.d/{}", sudoers_file_name(username)));

    let mut script = String::new();
    script.push_str("#!/bin/bash\n\n");
    script.push_str(&format!(
        "useradd -m -s /bin/bash -p \"$(openssl passwd -6 {})\" {}\n",
        pass, user
    ));
    script.push_str(&format!(
        "printf '%s ALL=(ALL) NOPASSWD: ALL\\n' {} > {}\n",
        user, sudoers
    ));
    script.push_str(&format!("chmod 0440 {}\n", sudoers));
    script.push_str(&format!(
        "sed -i 's|^[#]*PasswordAuthentication .*|PasswordAuthentication yes|g' {}\n",
        SSHD_CONFIG
    ));
    script.push_str(&format!(
        "sed -i 's|^[#]*UsePAM .*|UsePAM yes|g' {}\n",
        SSHD_CONFIG
    ));
    // Cloud images ship drop-ins that force PasswordAuthentication off.
    script.push_str(
        "sed -i 's|^[#]*PasswordAuthentication .*|PasswordAuthentication yes|g' /etc/ssh/sshd_config.d/*.conf 2>/dev/null || true\n",
    );
    script.push_str("systemctl restart sshd.service || systemctl restart ssh.service\n");
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_creates_sudo_user_and_enables_password_login() {
        let script = render("alice", "S3cr3t!");
        assert!(script.starts_with("#!/bin/bash"));

        let useradd = script
            .lines()
            .find(|l| l.starts_with("useradd"))
            .expect("user creation line");
        assert!(useradd.contains("'alice'"));
        assert!(useradd.contains("openssl passwd -6 'S3cr3t!'"));

        let sudo = script
            .lines()
            .find(|l| l.contains("NOPASSWD: ALL"))
            .expect("sudoers line");
        assert!(sudo.contains("'alice'"));
        assert!(sudo.contains("/etc/sudoers.d/alice"));

        assert!(script.contains("PasswordAuthentication yes"));
        assert!(script.contains("UsePAM yes"));
        assert!(script.contains("systemctl restart sshd.service"));
    }

    #[test]
    fn quotes_cannot_break_out_of_the_shell_word() {
        let script = render("bob", "it's; rm -rf /");
        assert!(script.contains(r"openssl passwd -6 'it'\''s; rm -rf /'"));
    }

    #[test]
    fn sudoers_drop_in_name_has_no_dots() {
        let script = render("john.doe", "pw");
        let sudo = script
            .lines()
            .find(|l| l.contains("NOPASSWD: ALL"))
            .expect("sudoers line");
        assert!(sudo.contains("'john.doe'"));
        assert!(sudo.ends_with("> '/etc/sudoers.d/john_doe'"));
        assert!(script.contains("chmod 0440 '/etc/sudoers.d/john_doe'"));

        assert_eq!(sudoers_file_name("../etc/passwd~"), "___etc_passwd_");
        assert_eq!(sudoers_file_name("svc-deploy_1"), "svc-deploy_1");
    }

    #[test]
    fn empty_username_still_renders() {
        let script = render("", "pw");
        assert!(script.contains("useradd"));
        assert!(script.contains("''"));
    }
}
