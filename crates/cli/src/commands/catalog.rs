//! List orderable items and the extras each one permits.

use dipper_core::Item;

/// One line per item: `snake_case_key  Display Name  [extra, ...]`.
#[must_use]
pub fn render() -> String {
    let mut out = String::new();
    for item in Item::ALL {
        let extras: Vec<_> = item.permitted().iter().map(|e| e.key()).collect();
        out.push_str(&format!(
            "{:<34} {:<42} [{}]\n",
            item.key(),
            item.name(),
            extras.join(", ")
        ));
    }
    out
}

/// Print the catalog to stdout.
pub fn print() {
    #[allow(clippy::print_stdout)]
    {
        print!("{}", render());
    }
}
