use catalog_admin::validation::{AttributeField, FormField, ProductForm};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut form = ProductForm::create(Some(3))?;

    println!("Fresh form valid: {}", form.is_valid());
    println!("Name error before touch: {:?}", form.visible_error(FormField::Name));
    form.blur(FormField::Name);
    println!("Name error after touch: {:?}", form.visible_error(FormField::Name));

    form.set_name("Desk lamp");
    form.set_units(Some(-1.0));

    let index = form.add_attribute();
    form.set_attribute_code(index, "colors");
    form.set_attribute_type(index, "tags");
    form.set_attribute_value(index, json!("red"));

    match form.submit(|draft| draft) {
        Ok(_) => println!("Unexpectedly accepted"),
        Err(errors) => {
            println!("\nSubmission blocked:");
            for (field, message) in errors.iter() {
                println!("  {}: {}", field, message);
            }
        }
    }

    form.set_units(Some(12.0));
    form.set_attribute_value(index, json!(["red", "white"]));
    println!(
        "\nTags error now: {:?}",
        form.visible_error(FormField::Attribute(index, AttributeField::Value))
    );

    let draft = form.submit(|draft| draft).map_err(|e| e.to_string())?;
    println!("\nDraft ready to send:\n{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}
