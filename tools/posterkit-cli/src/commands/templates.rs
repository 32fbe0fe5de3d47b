//! List built-in template styles.

use posterkit_editor_core::TemplateId;

pub fn run() -> anyhow::Result<()> {
    println!("{:<10} {:<12} {:<12}", "ID", "FOOTER", "FOOTER TEXT");
    for template in TemplateId::ALL {
        let palette = template.palette();
        println!(
            "{:<10} {:<12} {:<12}",
            template.as_str(),
            palette.footer_background.to_hex(),
            palette.footer_text.to_hex()
        );
    }
    Ok(())
}
