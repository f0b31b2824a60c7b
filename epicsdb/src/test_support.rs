use crate::schema::{parse_schema_str, SchemaDefinition};
use std::sync::Arc;

pub(crate) const TEST_SCHEMA: &str = r#"
menus:
  menuScan: [Passive, Event, "I/O Intr", "10 second", "5 second", "2 second", "1 second", ".5 second", ".2 second", ".1 second"]
  menuPini: ["NO", "YES", RUNNING, RUNNING_NOT_CONNECTED, PAUSED, PAUSED_NOT_CONNECTED]
  menuOmsl: [supervisory, closed_loop]
  fanoutSELM: [All, Specified, Mask]
  menuFtype: [STRING, CHAR, UCHAR, SHORT, USHORT, LONG, ULONG, INT64, UINT64, FLOAT, DOUBLE, ENUM]

record_types:
  ai:
    devices: ["Soft Channel", "Raw Soft Channel"]
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      PINI: { type: menu, menu: menuPini }
      DTYP: { type: device }
      FLNK: { type: fwdlink }
      INP: { type: inlink }
      VAL: { type: double }
      PREC: { type: short }
      EGU: { type: string, size: 16 }
      TPRO: { type: uchar }
      PACT: { type: noaccess }
  ao:
    devices: ["Soft Channel"]
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      DTYP: { type: device }
      FLNK: { type: fwdlink }
      OUT: { type: outlink }
      DOL: { type: inlink }
      OMSL: { type: menu, menu: menuOmsl }
      VAL: { type: double }
  bi:
    devices: ["Soft Channel"]
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      PINI: { type: menu, menu: menuPini }
      DTYP: { type: device }
      FLNK: { type: fwdlink }
      INP: { type: inlink }
      ZNAM: { type: string, size: 26 }
      ONAM: { type: string, size: 26 }
      VAL: { type: enum }
  bo:
    devices: ["Soft Channel"]
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      DTYP: { type: device }
      FLNK: { type: fwdlink }
      OUT: { type: outlink }
      ZNAM: { type: string, size: 26 }
      ONAM: { type: string, size: 26 }
  longin:
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      FLNK: { type: fwdlink }
      INP: { type: inlink }
      VAL: { type: long }
  stringin:
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      INP: { type: inlink }
      VAL: { type: string, size: 40 }
  waveform:
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      INP: { type: inlink }
      NELM: { type: ulong }
      FTVL: { type: menu, menu: menuFtype }
  calc:
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      CALC: { type: string, size: 80 }
      INPA: { type: inlink }
      INPB: { type: inlink }
      A: { type: double }
      VAL: { type: double }
  fanout:
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      PINI: { type: menu, menu: menuPini }
      SELM: { type: menu, menu: fanoutSELM }
      FLNK: { type: fwdlink }
      LNK1: { type: fwdlink }
      LNK2: { type: fwdlink }
      LNK3: { type: fwdlink }
      LNK4: { type: fwdlink }
      LNK5: { type: fwdlink }
      LNK6: { type: fwdlink }
  dfanout:
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      PINI: { type: menu, menu: menuPini }
      OMSL: { type: menu, menu: menuOmsl }
      DOL: { type: inlink }
      VAL: { type: long }
      FLNK: { type: fwdlink }
      OUTA: { type: outlink }
      OUTB: { type: outlink }
      OUTC: { type: outlink }
      OUTD: { type: outlink }
      OUTE: { type: outlink }
      OUTF: { type: outlink }
      OUTG: { type: outlink }
      OUTH: { type: outlink }
  mbbiDirect:
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      INP: { type: inlink }
      VAL: { type: long }
      B0: { type: uchar }
      B1: { type: uchar }
      B2: { type: uchar }
      B3: { type: uchar }
      B4: { type: uchar }
      B5: { type: uchar }
      B6: { type: uchar }
      B7: { type: uchar }
      B8: { type: uchar }
      B9: { type: uchar }
      BA: { type: uchar }
      BB: { type: uchar }
      BC: { type: uchar }
      BD: { type: uchar }
      BE: { type: uchar }
      BF: { type: uchar }
  mbboDirect:
    fields:
      NAME: { type: string, size: 61 }
      DESC: { type: string, size: 41 }
      SCAN: { type: menu, menu: menuScan }
      OUT: { type: outlink }
      OMSL: { type: menu, menu: menuOmsl }
      VAL: { type: long }
      B0: { type: uchar }
      B1: { type: uchar }
      B2: { type: uchar }
      B3: { type: uchar }
      B4: { type: uchar }
      B5: { type: uchar }
      B6: { type: uchar }
      B7: { type: uchar }
      B8: { type: uchar }
      B9: { type: uchar }
      BA: { type: uchar }
      BB: { type: uchar }
      BC: { type: uchar }
      BD: { type: uchar }
      BE: { type: uchar }
      BF: { type: uchar }
"#;

pub(crate) fn test_schema() -> SchemaDefinition {
    parse_schema_str(TEST_SCHEMA).unwrap()
}

pub(crate) fn test_database() -> crate::Database {
    crate::Database::new(Arc::new(test_schema()))
}
