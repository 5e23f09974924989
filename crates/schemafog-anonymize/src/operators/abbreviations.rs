/// Conventional short forms for words common in schema identifiers.
///
/// Short forms that would spell a reserved keyword (`desc`, `temp`) are avoided.
pub fn common_abbreviation(token: &str) -> Option<&'static str> {
    let short = match token {
        "account" => "acct",
        "address" => "addr",
        "amount" => "amt",
        "attribute" => "attr",
        "average" => "avg",
        "balance" => "bal",
        "category" => "cat",
        "column" => "col",
        "company" => "co",
        "count" => "cnt",
        "country" => "ctry",
        "customer" => "cust",
        "department" => "dept",
        "description" => "descr",
        "document" => "doc",
        "employee" => "emp",
        "government" => "govt",
        "height" => "ht",
        "identifier" => "ident",
        "information" => "info",
        "language" => "lang",
        "latitude" => "lat",
        "location" => "loc",
        "longitude" => "lon",
        "manager" => "mgr",
        "maximum" => "max",
        "message" => "msg",
        "minimum" => "min",
        "number" => "num",
        "organization" => "org",
        "percent" | "percentage" => "pct",
        "player" => "plyr",
        "position" => "pos",
        "price" => "prc",
        "product" => "prod",
        "quantity" => "qty",
        "reference" => "ref",
        "season" => "ssn",
        "standard" => "std",
        "statistics" => "stats",
        "street" => "st",
        "student" => "stu",
        "telephone" => "tel",
        "temperature" => "tmp",
        "total" => "tot",
        "transaction" => "txn",
        "value" => "val",
        "version" => "ver",
        "weight" => "wt",
        _ => return None,
    };
    Some(short)
}
